//! Pipeline orchestration module
//!
//! Ties plane sources, the stack loader, the external model fit and the
//! correction engine together, one channel at a time.

mod correction_pipeline;


pub use correction_pipeline::{ChannelStack, CorrectionPipeline};
