use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::source::types::{PlaneIndex, StackShape};

/// Capability shared by every kind of plane container.
///
/// Implementations release their underlying handles on drop.
pub trait PlaneSource {
    /// Human readable identifier used in diagnostics (usually the file path).
    fn name(&self) -> &str;

    fn shape(&self) -> &StackShape;

    /// Raw bytes of one plane, laid out as described by `shape().pixel_format`.
    fn read_raw_plane(&mut self, index: PlaneIndex) -> Result<Vec<u8>>;
}
