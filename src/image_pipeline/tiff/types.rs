//! Pipeline configuration types

use crate::image_pipeline::correction::CorrectionMode;
use crate::image_pipeline::stack::AxisSelection;

/// Pixel budget for the working-size stack handed to the model fit.
pub const DEFAULT_TARGET_NUM_PIXELS: usize = 9400;

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression, balanced level
    Deflate,
}

/// Configuration for loading stacks and correcting planes
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Pixel budget for the working size
    pub target_num_pixels: usize,
    /// Fit on full-resolution planes instead of downsampling
    pub skip_preprocessing: bool,
    /// Use the stack minimum image as the zero-light estimate when correcting
    pub use_min_image: bool,
    pub correction_mode: CorrectionMode,
    /// Explicit bit depth; estimated from the data when `None`
    pub bit_depth: Option<u32>,
    /// Series / z / time indices to read
    pub selection: AxisSelection,
    /// Channels to process, all of them when `None`
    pub channels: Option<Vec<usize>>,
    /// Compression for corrected output
    pub compression: TiffCompression,
    /// Replace existing output files
    pub overwrite: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_num_pixels: DEFAULT_TARGET_NUM_PIXELS,
            skip_preprocessing: false,
            use_min_image: false,
            correction_mode: CorrectionMode::ZeroLightPreserved,
            bit_depth: None,
            selection: AxisSelection::default(),
            channels: None,
            compression: TiffCompression::None,
            overwrite: false,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    target_num_pixels: Option<usize>,
    skip_preprocessing: Option<bool>,
    use_min_image: Option<bool>,
    correction_mode: Option<CorrectionMode>,
    bit_depth: Option<Option<u32>>,
    selection: Option<AxisSelection>,
    channels: Option<Option<Vec<usize>>>,
    compression: Option<TiffCompression>,
    overwrite: Option<bool>,
}

impl PipelineConfigBuilder {
    pub fn target_num_pixels(mut self, pixels: usize) -> Self {
        self.target_num_pixels = Some(pixels);
        self
    }

    pub fn skip_preprocessing(mut self, skip: bool) -> Self {
        self.skip_preprocessing = Some(skip);
        self
    }

    pub fn use_min_image(mut self, enable: bool) -> Self {
        self.use_min_image = Some(enable);
        self
    }

    pub fn correction_mode(mut self, mode: CorrectionMode) -> Self {
        self.correction_mode = Some(mode);
        self
    }

    pub fn bit_depth(mut self, bits: Option<u32>) -> Self {
        self.bit_depth = Some(bits);
        self
    }

    pub fn selection(mut self, selection: AxisSelection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn channels(mut self, channels: Option<Vec<usize>>) -> Self {
        self.channels = Some(channels);
        self
    }

    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = Some(overwrite);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig {
            target_num_pixels: self.target_num_pixels.unwrap_or(default.target_num_pixels),
            skip_preprocessing: self.skip_preprocessing.unwrap_or(default.skip_preprocessing),
            use_min_image: self.use_min_image.unwrap_or(default.use_min_image),
            correction_mode: self.correction_mode.unwrap_or(default.correction_mode),
            bit_depth: self.bit_depth.unwrap_or(default.bit_depth),
            selection: self.selection.unwrap_or(default.selection),
            channels: self.channels.unwrap_or(default.channels),
            compression: self.compression.unwrap_or(default.compression),
            overwrite: self.overwrite.unwrap_or(default.overwrite),
        }
    }
}
