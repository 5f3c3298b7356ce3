//! Camera raw files as single-plane sources, decoded with rawloader.
//!
//! Useful for flat-field work straight off a sensor: the Bayer mosaic is kept
//! as one 16-bit plane, no demosaicing is applied.

use std::io::Cursor;
use std::path::Path;

use rawloader::RawImageData as RawloaderImageData;
use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixels::PixelFormat;
use crate::image_pipeline::source::reader::PlaneSource;
use crate::image_pipeline::source::types::{PlaneIndex, StackShape};

/// Default bit depth when no white level information is available from the RAW file.
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

/// The bit width of the u16 data type, used for calculating actual bits per sample.
const U16_BITS: u32 = 16;

pub struct RawFilePlaneSource {
    name: String,
    shape: StackShape,
    plane: Vec<u8>,
}

impl RawFilePlaneSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let data = std::fs::read(path)
            .map_err(|e| PipelineError::InputReadError(format!("{}: {}", name, e)))?;
        Self::from_bytes(name, &data)
    }

    /// Decodes an in-memory raw file.
    pub fn from_bytes(name: impl Into<String>, data: &[u8]) -> Result<Self> {
        let name = name.into();
        debug!("Decoding RAW image, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| PipelineError::DecodeError(format!("{}: {}", name, e)))?;

        if decoded.cpp != 1 {
            return Err(PipelineError::DecodeError(format!(
                "{}: expected one component per pixel, found {}",
                name, decoded.cpp
            )));
        }

        // Float data is normalized 0.0-1.0, scale it to the u16 range
        let samples: Vec<u16> = match decoded.data {
            RawloaderImageData::Integer(values) => values,
            RawloaderImageData::Float(values) => {
                values.iter().map(|&v| (v * u16::MAX as f32) as u16).collect()
            }
        };

        // The sensor white level tells us how many bits are actually used.
        let max_white_level = decoded.whitelevels.iter().max().copied().unwrap_or(u16::MAX);
        let bits_per_sample = if max_white_level == 0 {
            DEFAULT_BITS_PER_SAMPLE
        } else {
            U16_BITS - max_white_level.leading_zeros()
        };

        debug!(
            width = decoded.width,
            height = decoded.height,
            bits_per_sample,
            "Decoded RAW image"
        );

        let shape = StackShape {
            width: decoded.width,
            height: decoded.height,
            series_count: 1,
            channel_count: 1,
            time_count: 1,
            z_count: 1,
            pixel_format: PixelFormat::uint16(true),
            bits_per_sample,
        };

        Ok(Self {
            name,
            shape,
            plane: samples.into_iter().flat_map(u16::to_le_bytes).collect(),
        })
    }
}

impl PlaneSource for RawFilePlaneSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> &StackShape {
        &self.shape
    }

    fn read_raw_plane(&mut self, index: PlaneIndex) -> Result<Vec<u8>> {
        if !index.fits(&self.shape) {
            return Err(PipelineError::InputReadError(format!(
                "{}: plane {:?} is outside the stack",
                self.name, index
            )));
        }
        Ok(self.plane.clone())
    }
}
