use tracing::{error, info, instrument};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::source::{PlaneSource, StackShape};

/// Explicit series / z / time indices to load. Empty means all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisSelection {
    pub series: Vec<usize>,
    pub z: Vec<usize>,
    pub time: Vec<usize>,
}

impl AxisSelection {
    pub fn all() -> Self {
        Self::default()
    }
}

/// Shape shared by every source plus the concrete indices to iterate.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStack {
    pub shape: StackShape,
    pub series: Vec<usize>,
    pub z: Vec<usize>,
    pub time: Vec<usize>,
    pub source_count: usize,
}

impl ResolvedStack {
    /// Planes read from each source for one channel.
    pub fn planes_per_source(&self) -> usize {
        self.series.len() * self.time.len() * self.z.len()
    }

    /// Planes read across all sources for one channel.
    pub fn plane_count(&self) -> usize {
        self.planes_per_source() * self.source_count
    }
}

/// Determines the stack shape shared by `sources` and validates `selection`
/// against every one of them.
#[instrument(skip_all, fields(sources = sources.len()))]
pub fn resolve_dimensions(sources: &[Box<dyn PlaneSource>], selection: &AxisSelection) -> Result<ResolvedStack> {
    let first = sources.first().ok_or(PipelineError::NoSources)?;
    let shape = *first.shape();

    if shape.width == 0 || shape.height == 0 {
        return Err(PipelineError::InvalidDimensions(shape.width, shape.height));
    }

    // Known before any plane is read, so under-populated sources fail fast.
    let max_series = selection.series.iter().max().copied();
    let max_z = selection.z.iter().max().copied();
    let max_time = selection.time.iter().max().copied();

    for source in sources {
        check_shape(source.name(), &shape, source.shape())?;

        let found = source.shape();
        check_axis(source.name(), "series", max_series, found.series_count)?;
        check_axis(source.name(), "timepoints", max_time, found.time_count)?;
        check_axis(source.name(), "z sections", max_z, found.z_count)?;
    }

    let resolved = ResolvedStack {
        shape,
        series: expand(&selection.series, shape.series_count),
        z: expand(&selection.z, shape.z_count),
        time: expand(&selection.time, shape.time_count),
        source_count: sources.len(),
    };

    if resolved.planes_per_source() == 0 {
        error!("Empty dimension found. Nothing to read.");
        return Err(PipelineError::EmptyStack);
    }

    info!(
        width = shape.width,
        height = shape.height,
        series = resolved.series.len(),
        z = resolved.z.len(),
        time = resolved.time.len(),
        "Using {} images to build the model",
        resolved.plane_count()
    );

    Ok(resolved)
}

/// Compares every shape field, logging each mismatch before failing on the first.
fn check_shape(name: &str, expected: &StackShape, found: &StackShape) -> Result<()> {
    let fields: [(&'static str, String, String); 8] = [
        ("Width", expected.width.to_string(), found.width.to_string()),
        ("Height", expected.height.to_string(), found.height.to_string()),
        ("Series count", expected.series_count.to_string(), found.series_count.to_string()),
        ("Channel count", expected.channel_count.to_string(), found.channel_count.to_string()),
        ("Timepoint count", expected.time_count.to_string(), found.time_count.to_string()),
        ("Z section count", expected.z_count.to_string(), found.z_count.to_string()),
        ("Pixel format", format!("{:?}", expected.pixel_format), format!("{:?}", found.pixel_format)),
        ("Bits per sample", expected.bits_per_sample.to_string(), found.bits_per_sample.to_string()),
    ];

    let mut mismatches = fields.into_iter().filter(|(_, e, f)| e != f);
    let Some((field, expected, found)) = mismatches.next() else {
        return Ok(());
    };
    error!(file = name, "{} differs: expected {}, found {}", field, expected, found);
    for (other, e, f) in mismatches {
        error!(file = name, "{} differs: expected {}, found {}", other, e, f);
    }

    Err(PipelineError::ShapeMismatch {
        file: name.to_string(),
        field,
        expected,
        found,
    })
}

fn check_axis(name: &str, axis: &'static str, max_index: Option<usize>, available: usize) -> Result<()> {
    match max_index {
        Some(required) if required >= available => {
            error!(file = name, "Not enough {}", axis);
            Err(PipelineError::InsufficientAxis {
                file: name.to_string(),
                axis,
                required,
                available,
            })
        }
        _ => Ok(()),
    }
}

fn expand(selected: &[usize], count: usize) -> Vec<usize> {
    if selected.is_empty() {
        (0..count).collect()
    } else {
        selected.to_vec()
    }
}
