use std::collections::HashMap;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixels::{encode_plane, PixelFormat, Plane};
use crate::image_pipeline::source::reader::PlaneSource;
use crate::image_pipeline::source::types::{PlaneIndex, StackShape};

/// Plane source backed by byte buffers held in memory.
#[derive(Debug, Clone)]
pub struct MemoryPlaneSource {
    name: String,
    shape: StackShape,
    planes: HashMap<PlaneIndex, Vec<u8>>,
}

impl MemoryPlaneSource {
    pub fn new(name: impl Into<String>, shape: StackShape) -> Self {
        Self {
            name: name.into(),
            shape,
            planes: HashMap::new(),
        }
    }

    /// Builds a single-series, single-channel, single-timepoint z-stack from
    /// `planes`, encoding each one with `format`.
    pub fn from_planes(name: impl Into<String>, planes: &[Plane], format: PixelFormat) -> Result<Self> {
        let first = planes.first().ok_or(PipelineError::EmptyStack)?;
        let shape = StackShape {
            width: first.width(),
            height: first.height(),
            series_count: 1,
            channel_count: 1,
            time_count: 1,
            z_count: planes.len(),
            pixel_format: format,
            bits_per_sample: format.bits_per_sample(),
        };
        let mut source = Self::new(name, shape);
        for (z, plane) in planes.iter().enumerate() {
            source.insert(PlaneIndex::new(0, z, 0, 0), encode_plane(plane, format)?)?;
        }
        Ok(source)
    }

    pub fn insert(&mut self, index: PlaneIndex, bytes: Vec<u8>) -> Result<()> {
        if !index.fits(&self.shape) {
            return Err(PipelineError::InputReadError(format!(
                "{}: plane {:?} is outside the stack",
                self.name, index
            )));
        }
        let expected = self.shape.pixel_format.plane_len(self.shape.width, self.shape.height);
        if bytes.len() != expected {
            return Err(PipelineError::TruncatedPlane { expected, found: bytes.len() });
        }
        self.planes.insert(index, bytes);
        Ok(())
    }
}

impl PlaneSource for MemoryPlaneSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> &StackShape {
        &self.shape
    }

    fn read_raw_plane(&mut self, index: PlaneIndex) -> Result<Vec<u8>> {
        self.planes.get(&index).cloned().ok_or_else(|| {
            PipelineError::InputReadError(format!("{}: no plane at {:?}", self.name, index))
        })
    }
}
