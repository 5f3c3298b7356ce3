use tracing::{debug, info, instrument};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixels::{decode_plane, BilinearResampler, Plane, Resampler, WorkingSize};
use crate::image_pipeline::source::{PlaneIndex, PlaneSource};
use crate::image_pipeline::stack::dimensions::ResolvedStack;

/// Output of a channel load.
#[derive(Debug, Clone)]
pub struct LoadedStack {
    /// Working-size planes in series, z, time order
    pub planes: Vec<Plane>,
    /// Elementwise minimum over every full-resolution plane
    pub min_image: Plane,
    /// Largest sample seen in any full-resolution plane
    pub max_sample: f64,
}

/// Running minimum image and maximum sample over a set of planes.
///
/// Both reductions are commutative and associative, so partial accumulators
/// built over disjoint plane sets can be merged with [`combine`](Self::combine)
/// in any order.
#[derive(Debug, Clone, Default)]
pub struct StackAccumulator {
    min_image: Option<Plane>,
    max_sample: f64,
    planes: usize,
}

impl StackAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn planes(&self) -> usize {
        self.planes
    }

    /// Folds one full-resolution plane into the accumulator.
    pub fn add(self, plane: &Plane) -> Result<Self> {
        let min_image = match self.min_image {
            None => plane.clone(),
            Some(acc) => acc.elementwise_min(plane)?,
        };
        let max_sample = if self.planes == 0 {
            plane.max()
        } else {
            self.max_sample.max(plane.max())
        };
        Ok(Self {
            min_image: Some(min_image),
            max_sample,
            planes: self.planes + 1,
        })
    }

    pub fn combine(self, other: Self) -> Result<Self> {
        if other.planes == 0 {
            return Ok(self);
        }
        if self.planes == 0 {
            return Ok(other);
        }
        let min_image = match (self.min_image, other.min_image) {
            (Some(a), Some(b)) => Some(a.elementwise_min(&b)?),
            (a, b) => a.or(b),
        };
        Ok(Self {
            min_image,
            max_sample: self.max_sample.max(other.max_sample),
            planes: self.planes + other.planes,
        })
    }

    /// Final minimum image and maximum sample; fails if nothing was added.
    pub fn finish(self) -> Result<(Plane, f64)> {
        let min_image = self.min_image.ok_or(PipelineError::EmptyStack)?;
        Ok((min_image, self.max_sample))
    }
}

/// Reads every selected plane of one channel and reduces it for model fitting.
pub struct StackLoader<R: Resampler = BilinearResampler> {
    resampler: R,
}

impl StackLoader<BilinearResampler> {
    pub fn new() -> Self {
        Self { resampler: BilinearResampler }
    }
}

impl Default for StackLoader<BilinearResampler> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resampler> StackLoader<R> {
    pub fn with_resampler(resampler: R) -> Self {
        Self { resampler }
    }

    /// Loads `channel` from every source.
    ///
    /// Sources are visited in order, then series, z and time (innermost).
    /// Any plane that fails to read or decode aborts the whole load.
    #[instrument(skip(self, sources, stack), fields(planes = stack.plane_count()))]
    pub fn load(
        &self,
        sources: &mut [Box<dyn PlaneSource>],
        stack: &ResolvedStack,
        channel: usize,
        working_size: WorkingSize,
    ) -> Result<LoadedStack> {
        let shape = stack.shape;
        if channel >= shape.channel_count {
            return Err(PipelineError::ChannelOutOfRange {
                channel,
                available: shape.channel_count,
            });
        }

        info!(
            "Loading {} planes from channel {} at {}x{}",
            stack.plane_count(),
            channel,
            working_size.width,
            working_size.height
        );

        let mut planes = Vec::with_capacity(stack.plane_count());
        let mut acc = StackAccumulator::new();

        for source in sources.iter_mut() {
            info!(file = source.name(), "Reading planes");
            for &series in &stack.series {
                for &z in &stack.z {
                    for &time in &stack.time {
                        let index = PlaneIndex::new(series, z, channel, time);
                        let raw = source.read_raw_plane(index)?;
                        let plane = decode_plane(&raw, shape.pixel_format, shape.width, shape.height)?;

                        debug!(series, z, time, min = plane.min(), max = plane.max(), "Plane decoded");

                        acc = acc.add(&plane)?;
                        planes.push(self.resampler.resample(&plane, working_size));
                    }
                }
            }
        }

        let (min_image, max_sample) = acc.finish()?;
        debug!(
            mean = min_image.mean(),
            min = min_image.min(),
            max = min_image.max(),
            "Min image stats"
        );

        Ok(LoadedStack { planes, min_image, max_sample })
    }
}
