//! Sample decoding between raw plane bytes and `f64` planes.
//!
//! Byte offsets follow `x * bytes_per_sample + y * bytes_per_sample * width`,
//! so a buffer is consumed sample by sample in row-major order.
//!
//! Sign handling is deliberately asymmetric across widths:
//!
//! | width | read as                 | bias subtracted        |
//! |-------|-------------------------|------------------------|
//! | 1     | `i8`                    | `i8::MIN` if unsigned  |
//! | 2     | `u16`                   | `i16::MIN` if signed   |
//! | 4 int | `i32`                   | `i32::MIN` if unsigned |
//! | 8 int | `i64`                   | `i64::MIN` if unsigned |
//! | 4/8 f | `f32` / `f64`           | none                   |
//!
//! Bias arithmetic happens in `f64`, so the 4 and 8 byte cases never wrap.

use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixels::types::{PixelFormat, Plane};

/// Decodes a raw plane into `width`×`height` samples.
///
/// Returns [`PipelineError::UnsupportedSampleFormat`] for any
/// `(bytes_per_sample, floating_point)` pair outside the table above and
/// [`PipelineError::TruncatedPlane`] if the buffer is too short.
pub fn decode_plane(bytes: &[u8], format: PixelFormat, width: usize, height: usize) -> Result<Plane> {
    check_supported(format)?;
    let expected = format.plane_len(width, height);
    if bytes.len() < expected {
        return Err(PipelineError::TruncatedPlane { expected, found: bytes.len() });
    }
    let bytes = &bytes[..expected];
    let le = format.little_endian;
    let bias = sign_bias(format);

    debug!(
        bytes_per_sample = format.bytes_per_sample,
        floating_point = format.floating_point,
        bias,
        "Decoding plane"
    );

    let data: Vec<f64> = match (format.bytes_per_sample, format.floating_point) {
        (1, false) => bytes.iter().map(|&b| b as i8 as f64 - bias).collect(),
        (2, false) => samples::<2>(bytes)
            .map(|s| (if le { u16::from_le_bytes(s) } else { u16::from_be_bytes(s) }) as f64 - bias)
            .collect(),
        (4, true) => samples::<4>(bytes)
            .map(|s| (if le { f32::from_le_bytes(s) } else { f32::from_be_bytes(s) }) as f64)
            .collect(),
        (4, false) => samples::<4>(bytes)
            .map(|s| (if le { i32::from_le_bytes(s) } else { i32::from_be_bytes(s) }) as f64 - bias)
            .collect(),
        (8, true) => samples::<8>(bytes)
            .map(|s| if le { f64::from_le_bytes(s) } else { f64::from_be_bytes(s) })
            .collect(),
        (8, false) => samples::<8>(bytes)
            .map(|s| (if le { i64::from_le_bytes(s) } else { i64::from_be_bytes(s) }) as f64 - bias)
            .collect(),
        _ => unreachable!("format checked above"),
    };

    Plane::new(width, height, data)
}

/// Inverse of [`decode_plane`]: produces the raw bytes that decode back to `plane`.
///
/// Integer targets round to nearest and saturate at the storage range.
pub fn encode_plane(plane: &Plane, format: PixelFormat) -> Result<Vec<u8>> {
    check_supported(format)?;
    let le = format.little_endian;
    let bias = sign_bias(format);
    let mut out = Vec::with_capacity(format.plane_len(plane.width(), plane.height()));

    for &v in plane.data() {
        let stored = v + bias;
        match (format.bytes_per_sample, format.floating_point) {
            (1, false) => out.push(stored.round() as i8 as u8),
            (2, false) => {
                let s = stored.round() as u16;
                out.extend_from_slice(&if le { s.to_le_bytes() } else { s.to_be_bytes() });
            }
            (4, true) => {
                let s = v as f32;
                out.extend_from_slice(&if le { s.to_le_bytes() } else { s.to_be_bytes() });
            }
            (4, false) => {
                let s = stored.round() as i32;
                out.extend_from_slice(&if le { s.to_le_bytes() } else { s.to_be_bytes() });
            }
            (8, true) => {
                out.extend_from_slice(&if le { v.to_le_bytes() } else { v.to_be_bytes() });
            }
            (8, false) => {
                let s = stored.round() as i64;
                out.extend_from_slice(&if le { s.to_le_bytes() } else { s.to_be_bytes() });
            }
            _ => unreachable!("format checked above"),
        }
    }
    Ok(out)
}

fn check_supported(format: PixelFormat) -> Result<()> {
    match (format.bytes_per_sample, format.floating_point) {
        (1, false) | (2, false) | (4, _) | (8, _) => Ok(()),
        (bytes_per_sample, floating_point) => Err(PipelineError::UnsupportedSampleFormat {
            bytes_per_sample,
            floating_point,
        }),
    }
}

/// Value subtracted from the stored integer to obtain the sample.
fn sign_bias(format: PixelFormat) -> f64 {
    if format.floating_point {
        return 0.0;
    }
    match format.bytes_per_sample {
        1 if format.unsigned => i8::MIN as f64,
        2 if !format.unsigned => i16::MIN as f64,
        4 if format.unsigned => i32::MIN as f64,
        8 if format.unsigned => i64::MIN as f64,
        _ => 0.0,
    }
}

fn samples<const N: usize>(bytes: &[u8]) -> impl Iterator<Item = [u8; N]> + '_ {
    bytes.chunks_exact(N).map(|chunk| {
        let mut sample = [0u8; N];
        sample.copy_from_slice(chunk);
        sample
    })
}
