use rayon::prelude::*;
use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::correction::types::{CorrectionMode, ModelDescriptor};
use crate::image_pipeline::pixels::Plane;

/// Removes the modelled illumination bias from a full-resolution plane.
///
/// With `use_min_image` the zero-light term is the model's minimum image,
/// re-centred on the mean of the zero-light field. Gain values of zero are
/// not guarded: the output then holds infinities or NaNs for those pixels.
pub fn correct_plane(
    plane: &Plane,
    model: &ModelDescriptor,
    mode: CorrectionMode,
    use_min_image: bool,
) -> Result<Plane> {
    if plane.size() != model.image_size() {
        let size = model.image_size();
        return Err(PipelineError::ModelShapeMismatch {
            model_width: size.width,
            model_height: size.height,
            plane_width: plane.width(),
            plane_height: plane.height(),
        });
    }

    let mean_v = model.v.mean();
    let mean_z = model.z.mean();
    let mean_min_image = model.min_image.mean();
    debug!(mean_v, mean_z, mean_min_image, %mode, use_min_image, "Correcting plane");

    let data: Vec<f64> = (plane.data(), model.v.data(), model.z.data(), model.min_image.data())
        .into_par_iter()
        .map(|(&pixel, &v, &z, &min)| {
            let numerator = if use_min_image {
                pixel - (min - mean_min_image + mean_z)
            } else {
                pixel - z
            };
            let ratio = numerator / v;
            match mode {
                CorrectionMode::ZeroLightPreserved => ratio * mean_v + mean_z,
                CorrectionMode::DynamicRangeCorrected => ratio * mean_v,
                CorrectionMode::Direct => ratio,
            }
        })
        .collect();

    Plane::new(plane.width(), plane.height(), data)
}
