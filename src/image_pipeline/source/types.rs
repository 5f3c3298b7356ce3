//! Stack geometry types

use crate::image_pipeline::pixels::types::PixelFormat;

/// Geometry and sample format of one plane source.
///
/// Every source contributing to a stack must report an identical shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackShape {
    pub width: usize,
    pub height: usize,
    pub series_count: usize,
    pub channel_count: usize,
    pub time_count: usize,
    pub z_count: usize,
    pub pixel_format: PixelFormat,
    /// Bits per sample as reported by the container
    pub bits_per_sample: u32,
}

/// Address of a single plane within a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaneIndex {
    pub series: usize,
    pub z: usize,
    pub channel: usize,
    pub time: usize,
}

impl PlaneIndex {
    pub const fn new(series: usize, z: usize, channel: usize, time: usize) -> Self {
        Self { series, z, channel, time }
    }

    /// Whether every coordinate fits inside `shape`.
    pub fn fits(&self, shape: &StackShape) -> bool {
        self.series < shape.series_count
            && self.z < shape.z_count
            && self.channel < shape.channel_count
            && self.time < shape.time_count
    }
}
