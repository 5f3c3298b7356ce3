use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No plane sources were provided")]
    NoSources,

    #[error("{field} differs for {file}: expected {expected}, found {found}")]
    ShapeMismatch {
        file: String,
        field: &'static str,
        expected: String,
        found: String,
    },

    #[error("Not enough {axis} in {file}: index {required} requested, {available} available")]
    InsufficientAxis {
        file: String,
        axis: &'static str,
        required: usize,
        available: usize,
    },

    #[error("Empty dimension found, nothing to read")]
    EmptyStack,

    #[error("Requested channel {channel} but the stack has {available} channels")]
    ChannelOutOfRange { channel: usize, available: usize },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Model is {model_width}x{model_height} but plane is {plane_width}x{plane_height}")]
    ModelShapeMismatch {
        model_width: usize,
        model_height: usize,
        plane_width: usize,
        plane_height: usize,
    },

    #[error("Unsupported sample format: {bytes_per_sample} bytes per sample, floating point={floating_point}")]
    UnsupportedSampleFormat {
        bytes_per_sample: usize,
        floating_point: bool,
    },

    #[error("Truncated plane: expected {expected} bytes, found {found}")]
    TruncatedPlane { expected: usize, found: usize },

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("Model fit failed: {0}")]
    ModelFitError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
