//! Stack preparation module
//!
//! Resolves one shared shape across all plane sources, plans the working
//! resolution, loads a channel into a downsampled plane sequence plus a
//! full-resolution minimum image, and classifies the observed bit depth.

mod dimensions;
mod working_size;
mod loader;
mod bit_depth;

#[cfg(test)]
mod tests;

pub use dimensions::{resolve_dimensions, AxisSelection, ResolvedStack};
pub use working_size::plan_working_size;
pub use loader::{LoadedStack, StackAccumulator, StackLoader};
pub use bit_depth::{estimate_bit_depth, resolve_bit_depth};
