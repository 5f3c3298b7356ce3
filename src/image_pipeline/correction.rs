//! Illumination correction module
//!
//! Holds the fitted model types, the boundary to the external model fitter,
//! model persistence, and the per-pixel correction engine.

mod engine;
mod fitter;
mod model_io;
pub mod types;


pub use engine::correct_plane;
pub use fitter::{FitOptions, ModelFitter};
pub use model_io::{read_model, write_model};
pub use types::{CorrectionMode, ModelDescriptor};
