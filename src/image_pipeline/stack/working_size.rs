use crate::image_pipeline::pixels::WorkingSize;

/// Largest aspect-preserving size whose pixel count stays near `target_pixels`.
///
/// Never upsamples; each side is at least one pixel.
pub fn plan_working_size(width: usize, height: usize, target_pixels: usize) -> WorkingSize {
    let scale = (target_pixels as f64 / (width as f64 * height as f64))
        .sqrt()
        .min(1.0);

    WorkingSize {
        width: ((width as f64 * scale).round() as usize).max(1),
        height: ((height as f64 * scale).round() as usize).max(1),
    }
}
