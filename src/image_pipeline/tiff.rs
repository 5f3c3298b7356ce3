//! TIFF writing module
//!
//! Corrected planes leave the pipeline through a [`PlaneSink`]; the default
//! sink writes 32-bit float grayscale TIFF pages. Pipeline configuration
//! lives here as well.

mod writer;
mod standard_tiff_writer;
pub mod types;

#[cfg(test)]
mod tests;

pub use writer::PlaneSink;
pub use standard_tiff_writer::TiffPlaneSink;
pub use types::{TiffCompression, PipelineConfig, PipelineConfigBuilder};
