//! Pixel ingestion module
//!
//! Raw byte buffers become [`Plane`]s of `f64` samples here, and planes are
//! resampled to the working resolution used for model fitting.

mod decoder;
mod resample;
pub mod types;


pub use decoder::{decode_plane, encode_plane};
pub use resample::{BilinearResampler, Resampler};
pub use types::{PixelFormat, Plane, WorkingSize};
