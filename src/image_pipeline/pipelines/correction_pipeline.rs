use tracing::{info, instrument};
use std::io::Write;
use std::path::Path;

use crate::image_pipeline::{
    common::error::{PipelineError, Result},
    correction::{correct_plane, FitOptions, ModelDescriptor, ModelFitter},
    pixels::{decode_plane, BilinearResampler, Resampler, WorkingSize},
    source::{open_plane_source, PlaneIndex, PlaneSource, StackShape},
    stack::{plan_working_size, resolve_bit_depth, resolve_dimensions, LoadedStack, ResolvedStack, StackLoader},
    tiff::{PipelineConfig, PlaneSink, TiffPlaneSink},
};

/// One loaded channel, ready for the model fit.
#[derive(Debug, Clone)]
pub struct ChannelStack {
    pub channel: usize,
    pub stack: LoadedStack,
    pub bit_depth: u32,
    pub image_size: WorkingSize,
    pub working_size: WorkingSize,
}

impl ChannelStack {
    pub fn fit_options(&self) -> FitOptions {
        FitOptions::new(self.bit_depth, self.image_size, self.working_size)
    }
}

/// Loads channels from a set of plane sources and applies fitted models to them.
///
/// Sources stay open for the lifetime of the pipeline and close when it drops.
pub struct CorrectionPipeline<W: PlaneSink, R: Resampler = BilinearResampler> {
    sources: Vec<Box<dyn PlaneSource>>,
    stack: ResolvedStack,
    working_size: WorkingSize,
    loader: StackLoader<R>,
    writer: W,
    config: PipelineConfig,
}

impl CorrectionPipeline<TiffPlaneSink> {
    /// Opens every file in `paths` and validates that they form one stack.
    #[instrument(skip_all, fields(files = paths.len()))]
    pub fn open<P: AsRef<Path>>(paths: &[P], config: PipelineConfig) -> Result<Self> {
        let sources = {
            let _span = tracing::info_span!("open_sources").entered();
            paths
                .iter()
                .map(open_plane_source)
                .collect::<Result<Vec<_>>>()?
        };
        Self::with_custom(sources, BilinearResampler, TiffPlaneSink, config)
    }
}

impl<W: PlaneSink, R: Resampler> CorrectionPipeline<W, R> {
    pub fn with_custom(
        sources: Vec<Box<dyn PlaneSource>>,
        resampler: R,
        writer: W,
        config: PipelineConfig,
    ) -> Result<Self> {
        let stack = {
            let _span = tracing::info_span!("resolve_dimensions").entered();
            resolve_dimensions(&sources, &config.selection)?
        };

        let shape = stack.shape;
        let working_size = if config.skip_preprocessing {
            WorkingSize::new(shape.width, shape.height)
        } else {
            plan_working_size(shape.width, shape.height, config.target_num_pixels)
        };

        info!(
            width = shape.width,
            height = shape.height,
            working_width = working_size.width,
            working_height = working_size.height,
            "Stack resolved"
        );

        Ok(Self {
            sources,
            stack,
            working_size,
            loader: StackLoader::with_resampler(resampler),
            writer,
            config,
        })
    }

    pub fn shape(&self) -> &StackShape {
        &self.stack.shape
    }

    pub fn resolved(&self) -> &ResolvedStack {
        &self.stack
    }

    pub fn image_size(&self) -> WorkingSize {
        WorkingSize::new(self.stack.shape.width, self.stack.shape.height)
    }

    pub fn working_size(&self) -> WorkingSize {
        self.working_size
    }

    /// Channels to process: the configured list, or every channel.
    pub fn channels(&self) -> Vec<usize> {
        match &self.config.channels {
            Some(channels) => channels.clone(),
            None => (0..self.stack.shape.channel_count).collect(),
        }
    }

    #[instrument(skip(self))]
    pub fn load_channel(&mut self, channel: usize) -> Result<ChannelStack> {
        let stack = self
            .loader
            .load(&mut self.sources, &self.stack, channel, self.working_size)?;

        let bit_depth = resolve_bit_depth(
            self.config.bit_depth,
            stack.max_sample,
            self.stack.shape.bits_per_sample,
        );

        Ok(ChannelStack {
            channel,
            stack,
            bit_depth,
            image_size: self.image_size(),
            working_size: self.working_size,
        })
    }

    /// Loads `channel` and hands it to `fitter`.
    #[instrument(skip(self, fitter))]
    pub fn build_model(&mut self, channel: usize, fitter: &dyn ModelFitter) -> Result<ModelDescriptor> {
        let loaded = self.load_channel(channel)?;
        let options = loaded.fit_options();

        let model = {
            let _span = tracing::info_span!("fit_model", planes = loaded.stack.planes.len()).entered();
            fitter.fit(&loaded.stack, &options)?
        };

        self.check_model(&model)?;
        info!(channel, "Model built");
        Ok(model)
    }

    /// Corrects every selected plane of `channel` and writes them through the sink.
    ///
    /// Planes are visited in the same order the stack loader uses. Returns the
    /// number of planes written.
    #[instrument(skip(self, model, output))]
    pub fn correct_channel(&mut self, channel: usize, model: &ModelDescriptor, output: &mut dyn Write) -> Result<usize> {
        let shape = self.stack.shape;
        if channel >= shape.channel_count {
            return Err(PipelineError::ChannelOutOfRange {
                channel,
                available: shape.channel_count,
            });
        }
        self.check_model(model)?;

        let mode = self.config.correction_mode;
        let use_min_image = self.config.use_min_image;
        info!(%mode, use_min_image, "Correcting {} planes", self.stack.plane_count());

        let mut corrected = Vec::with_capacity(self.stack.plane_count());
        for source in self.sources.iter_mut() {
            for &series in &self.stack.series {
                for &z in &self.stack.z {
                    for &time in &self.stack.time {
                        let raw = source.read_raw_plane(PlaneIndex::new(series, z, channel, time))?;
                        let plane = decode_plane(&raw, shape.pixel_format, shape.width, shape.height)?;
                        corrected.push(correct_plane(&plane, model, mode, use_min_image)?);
                    }
                }
            }
        }

        {
            let _span = tracing::info_span!("write_planes").entered();
            self.writer.write_planes(&corrected, output, &self.config)?;
        }

        Ok(corrected.len())
    }

    /// Like [`correct_channel`](Self::correct_channel), writing to `output_path`.
    ///
    /// An existing file is only replaced when the config allows overwriting.
    /// The file is created once every plane has been corrected and encoded,
    /// so a failed run leaves nothing behind.
    pub fn correct_channel_to_file<P: AsRef<Path>>(
        &mut self,
        channel: usize,
        model: &ModelDescriptor,
        output_path: P,
    ) -> Result<usize> {
        let output_path = output_path.as_ref();
        if output_path.exists() && !self.config.overwrite {
            return Err(PipelineError::OutputWriteError(format!(
                "{}: file exists",
                output_path.display()
            )));
        }

        let mut buffer = Vec::new();
        let count = self.correct_channel(channel, model, &mut buffer)?;

        info!(output = %output_path.display(), channel, bytes = buffer.len(), "Writing corrected planes");

        std::fs::write(output_path, &buffer).map_err(|e| {
            PipelineError::OutputWriteError(format!("{}: {}", output_path.display(), e))
        })?;

        Ok(count)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn check_model(&self, model: &ModelDescriptor) -> Result<()> {
        let size = model.image_size();
        let image = self.image_size();
        if size != image {
            return Err(PipelineError::ModelShapeMismatch {
                model_width: size.width,
                model_height: size.height,
                plane_width: image.width,
                plane_height: image.height,
            });
        }
        Ok(())
    }
}
