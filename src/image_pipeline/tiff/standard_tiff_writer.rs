use std::io::Write;
use tracing::debug;
use crate::image_pipeline::common::error::{Result, PipelineError};
use crate::image_pipeline::pixels::Plane;
use crate::image_pipeline::tiff::types::{PipelineConfig, TiffCompression};
use crate::image_pipeline::tiff::writer::PlaneSink;

/// Writes one 32-bit float grayscale page per plane.
///
/// Samples are narrowed from `f64` here; non-finite values are kept as is.
pub struct TiffPlaneSink;

impl PlaneSink for TiffPlaneSink {
    fn write_planes(&self, planes: &[Plane], output: &mut dyn Write, config: &PipelineConfig) -> Result<()> {
        debug!("Encoding {} TIFF pages", planes.len());

        let mut buffer = Vec::new();

        let compression = match config.compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::Deflate => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Balanced),
        };

        let mut encoder = tiff::encoder::TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| PipelineError::EncodeError(e.to_string()))?
            .with_compression(compression);

        for plane in planes {
            let samples: Vec<f32> = plane.data().iter().map(|&v| v as f32).collect();
            encoder.write_image::<tiff::encoder::colortype::Gray32Float>(
                plane.width() as u32,
                plane.height() as u32,
                &samples,
            ).map_err(|e| PipelineError::EncodeError(e.to_string()))?;
        }
        drop(encoder);

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}
