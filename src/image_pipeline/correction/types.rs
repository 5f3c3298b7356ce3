use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixels::{Plane, WorkingSize};

/// How the fitted model is applied to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrectionMode {
    /// Keeps the original intensity range and zero-light level
    #[default]
    ZeroLightPreserved,
    /// Keeps the original intensity range, zero-light level removed
    DynamicRangeCorrected,
    /// Subtracts the zero-light term and divides by the gain
    Direct,
}

impl fmt::Display for CorrectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CorrectionMode::ZeroLightPreserved => "ZERO_LIGHT_PRESERVED",
            CorrectionMode::DynamicRangeCorrected => "DYNAMIC_RANGE_CORRECTED",
            CorrectionMode::Direct => "DIRECT",
        };
        f.write_str(name)
    }
}

impl FromStr for CorrectionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "ZERO_LIGHT_PRESERVED" => Ok(CorrectionMode::ZeroLightPreserved),
            "DYNAMIC_RANGE_CORRECTED" => Ok(CorrectionMode::DynamicRangeCorrected),
            "DIRECT" => Ok(CorrectionMode::Direct),
            other => Err(format!("unknown correction mode: {}", other)),
        }
    }
}

/// Fitted illumination model at original image resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    /// Gain field
    pub v: Plane,
    /// Zero-light field
    pub z: Plane,
    /// Minimum image of the stack the model was fitted on
    pub min_image: Plane,
}

impl ModelDescriptor {
    /// All three fields must share one size.
    pub fn new(v: Plane, z: Plane, min_image: Plane) -> Result<Self> {
        for field in [&z, &min_image] {
            if field.size() != v.size() {
                return Err(PipelineError::ModelShapeMismatch {
                    model_width: v.width(),
                    model_height: v.height(),
                    plane_width: field.width(),
                    plane_height: field.height(),
                });
            }
        }
        Ok(Self { v, z, min_image })
    }

    pub fn image_size(&self) -> WorkingSize {
        self.v.size()
    }
}
