//! Grayscale TIFF stacks as plane sources.
//!
//! Pages are laid out in XYCZT order: channel varies fastest, then z, then
//! time. A file holds a single series.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::ColorType;
use tracing::{debug, info};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixels::PixelFormat;
use crate::image_pipeline::source::reader::PlaneSource;
use crate::image_pipeline::source::types::{PlaneIndex, StackShape};

/// Upper bound on decoder buffers; microscopy planes can be large.
const DECODING_LIMIT_BYTES: usize = 1024 * 1024 * 1024;

pub struct TiffPlaneSource {
    name: String,
    shape: StackShape,
    decoder: Decoder<BufReader<File>>,
}

impl TiffPlaneSource {
    /// Opens a TIFF whose pages are all z-sections of one channel.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_layout(path, 1, 1)
    }

    /// Opens a TIFF holding `channels` × `timepoints` × z pages.
    pub fn open_with_layout<P: AsRef<Path>>(path: P, channels: usize, timepoints: usize) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();

        let file = File::open(path)
            .map_err(|e| PipelineError::InputReadError(format!("{}: {}", name, e)))?;

        let mut limits = Limits::default();
        limits.decoding_buffer_size = DECODING_LIMIT_BYTES;
        limits.ifd_value_size = DECODING_LIMIT_BYTES;
        limits.intermediate_buffer_size = DECODING_LIMIT_BYTES;

        let mut decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| tiff_error(&name, e))?
            .with_limits(limits);

        let (width, height) = decoder.dimensions().map_err(|e| tiff_error(&name, e))?;
        let bits_per_sample = match decoder.colortype().map_err(|e| tiff_error(&name, e))? {
            ColorType::Gray(bits) => bits as u32,
            other => {
                return Err(PipelineError::DecodeError(format!(
                    "{}: only single-sample grayscale TIFFs are supported, found {:?}",
                    name, other
                )));
            }
        };

        // The pixel format is only known once a page has been decoded.
        let first = decoder.read_image().map_err(|e| tiff_error(&name, e))?;
        let (pixel_format, _) = raw_bytes(&name, first)?;

        let mut pages = 1;
        while decoder.more_images() {
            decoder.next_image().map_err(|e| tiff_error(&name, e))?;
            pages += 1;
        }

        let per_z = channels * timepoints;
        if per_z == 0 || pages % per_z != 0 {
            return Err(PipelineError::DecodeError(format!(
                "{}: {} pages cannot be split into {} channels x {} timepoints",
                name, pages, channels, timepoints
            )));
        }

        let shape = StackShape {
            width: width as usize,
            height: height as usize,
            series_count: 1,
            channel_count: channels,
            time_count: timepoints,
            z_count: pages / per_z,
            pixel_format,
            bits_per_sample,
        };

        info!(
            file = %name,
            width = shape.width,
            height = shape.height,
            pages,
            "Opened TIFF stack"
        );

        Ok(Self { name, shape, decoder })
    }

    fn page_of(&self, index: PlaneIndex) -> usize {
        (index.time * self.shape.z_count + index.z) * self.shape.channel_count + index.channel
    }
}

impl PlaneSource for TiffPlaneSource {
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
        let page = self.page_of(index);
        debug!(file = %self.name, page, "Reading TIFF page");

        self.decoder
            .seek_to_image(page)
            .map_err(|e| tiff_error(&self.name, e))?;
        let image = self.decoder.read_image().map_err(|e| tiff_error(&self.name, e))?;
        let (format, bytes) = raw_bytes(&self.name, image)?;

        if format != self.shape.pixel_format {
            return Err(PipelineError::DecodeError(format!(
                "{}: page {} has pixel format {:?}, expected {:?}",
                self.name, page, format, self.shape.pixel_format
            )));
        }
        Ok(bytes)
    }
}

fn tiff_error(name: &str, e: tiff::TiffError) -> PipelineError {
    PipelineError::DecodeError(format!("{}: {}", name, e))
}

/// Re-encodes decoded TIFF samples into little-endian raw plane bytes.
///
/// Unsigned 8, 32 and 64 bit samples get their top bit flipped, matching the
/// offset-binary storage the sample decoder expects for those widths.
fn raw_bytes(name: &str, image: DecodingResult) -> Result<(PixelFormat, Vec<u8>)> {
    let unsigned = |bytes_per_sample| PixelFormat {
        bytes_per_sample,
        floating_point: false,
        little_endian: true,
        unsigned: true,
    };

    Ok(match image {
        DecodingResult::U8(buf) => (unsigned(1), buf.into_iter().map(|v| v ^ 0x80).collect()),
        DecodingResult::U16(buf) => (
            unsigned(2),
            buf.into_iter().flat_map(u16::to_le_bytes).collect(),
        ),
        DecodingResult::U32(buf) => (
            unsigned(4),
            buf.into_iter().flat_map(|v| (v ^ (1 << 31)).to_le_bytes()).collect(),
        ),
        DecodingResult::U64(buf) => (
            unsigned(8),
            buf.into_iter().flat_map(|v| (v ^ (1 << 63)).to_le_bytes()).collect(),
        ),
        DecodingResult::F32(buf) => (
            PixelFormat::float32(true),
            buf.into_iter().flat_map(f32::to_le_bytes).collect(),
        ),
        DecodingResult::F64(buf) => (
            PixelFormat::float64(true),
            buf.into_iter().flat_map(f64::to_le_bytes).collect(),
        ),
        _ => {
            return Err(PipelineError::DecodeError(format!(
                "{}: signed integer and half-float TIFF formats are not supported",
                name
            )));
        }
    })
}
