//! Plane and sample format types

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Numeric layout of the samples in a raw plane buffer.
///
/// Derived once per plane source and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    /// Bytes per sample: 1, 2, 4 or 8
    pub bytes_per_sample: usize,
    /// IEEE-754 samples (only valid with 4 or 8 bytes)
    pub floating_point: bool,
    /// Byte order of multi-byte samples
    pub little_endian: bool,
    /// Whether the source declares an unsigned pixel type
    pub unsigned: bool,
}

impl PixelFormat {
    pub const fn uint8() -> Self {
        Self { bytes_per_sample: 1, floating_point: false, little_endian: true, unsigned: true }
    }

    pub const fn uint16(little_endian: bool) -> Self {
        Self { bytes_per_sample: 2, floating_point: false, little_endian, unsigned: true }
    }

    pub const fn float32(little_endian: bool) -> Self {
        Self { bytes_per_sample: 4, floating_point: true, little_endian, unsigned: false }
    }

    pub const fn float64(little_endian: bool) -> Self {
        Self { bytes_per_sample: 8, floating_point: true, little_endian, unsigned: false }
    }

    /// Nominal bits per sample, as a container would report it.
    pub fn bits_per_sample(&self) -> u32 {
        (self.bytes_per_sample * 8) as u32
    }

    /// Number of bytes a `width`×`height` plane occupies.
    pub fn plane_len(&self, width: usize, height: usize) -> usize {
        width * height * self.bytes_per_sample
    }
}

/// Target resolution of a plane (also used for the original image size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingSize {
    pub width: usize,
    pub height: usize,
}

impl WorkingSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// Dense grid of `f64` samples stored row-major (`y * width + x`).
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Plane {
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        Ok(Self { width, height, data })
    }

    pub fn filled(size: WorkingSize, value: f64) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: vec![value; size.pixel_count()],
        }
    }

    /// Caller guarantees `data.len() == size.pixel_count()`.
    pub(crate) fn from_raw(size: WorkingSize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), size.pixel_count());
        Self { width: size.width, height: size.height, data }
    }

    /// Builds a plane from rows of equal length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if rows.iter().any(|r| r.as_ref().len() != width) {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        let data = rows.iter().flat_map(|r| r.as_ref().iter().copied()).collect();
        Self::new(width, height, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> WorkingSize {
        WorkingSize::new(self.width, self.height)
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn mean(&self) -> f64 {
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Elementwise minimum of two planes of identical size, as a new plane.
    pub fn elementwise_min(&self, other: &Plane) -> Result<Plane> {
        if self.size() != other.size() {
            return Err(PipelineError::InvalidDimensions(other.width, other.height));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| a.min(b))
            .collect();
        Ok(Plane { width: self.width, height: self.height, data })
    }
}
