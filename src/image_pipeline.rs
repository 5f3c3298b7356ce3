//! Illumination correction pipeline
//!
//! Ingests multi-dimensional microscopy stacks (series × time × z × channel,
//! possibly spread over several files), reduces each channel to a bounded
//! working representation for model fitting, and applies a fitted model back
//! onto full-resolution planes.

pub mod common;
pub mod pixels;
pub mod source;
pub mod stack;
pub mod correction;
pub mod tiff;
pub mod pipelines;

pub use common::{
    PipelineError,
    Result,
};

pub use pixels::{
    decode_plane,
    encode_plane,
    BilinearResampler,
    PixelFormat,
    Plane,
    Resampler,
    WorkingSize,
};

pub use source::{
    open_plane_source,
    MemoryPlaneSource,
    PlaneIndex,
    PlaneSource,
    RawFilePlaneSource,
    StackShape,
    TiffPlaneSource,
};

pub use stack::{
    estimate_bit_depth,
    plan_working_size,
    resolve_bit_depth,
    resolve_dimensions,
    AxisSelection,
    LoadedStack,
    ResolvedStack,
    StackAccumulator,
    StackLoader,
};

pub use correction::{
    correct_plane,
    read_model,
    write_model,
    CorrectionMode,
    FitOptions,
    ModelDescriptor,
    ModelFitter,
};

pub use tiff::{
    PipelineConfig,
    PipelineConfigBuilder,
    PlaneSink,
    TiffCompression,
    TiffPlaneSink,
};

pub use pipelines::{
    ChannelStack,
    CorrectionPipeline,
};
