//! Plane source module
//!
//! A plane source is anything that can report a [`StackShape`] and hand out
//! raw plane bytes by (series, z, channel, time) index. Files are opened with
//! [`open_plane_source`] which picks the implementation from the extension.

mod reader;
mod memory_source;
mod tiff_source;
mod rawloader_source;
pub mod types;


use std::path::Path;

use tracing::debug;

use crate::image_pipeline::common::error::Result;

pub use reader::PlaneSource;
pub use memory_source::MemoryPlaneSource;
pub use tiff_source::TiffPlaneSource;
pub use rawloader_source::RawFilePlaneSource;
pub use types::{PlaneIndex, StackShape};

/// Opens `path` as a TIFF stack (`.tif`/`.tiff`) or a camera raw file otherwise.
pub fn open_plane_source<P: AsRef<Path>>(path: P) -> Result<Box<dyn PlaneSource>> {
    let path = path.as_ref();
    let is_tiff = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
        .unwrap_or(false);

    debug!(path = %path.display(), is_tiff, "Opening plane source");

    if is_tiff {
        Ok(Box::new(TiffPlaneSource::open(path)?))
    } else {
        Ok(Box::new(RawFilePlaneSource::open(path)?))
    }
}
