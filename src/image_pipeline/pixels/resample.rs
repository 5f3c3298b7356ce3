use rayon::prelude::*;

use crate::image_pipeline::pixels::types::{Plane, WorkingSize};

/// Resizes a plane to an exact target size.
pub trait Resampler {
    fn resample(&self, plane: &Plane, target: WorkingSize) -> Plane;
}

/// Pixel-centre aligned bilinear resampling with edge clamping.
#[derive(Debug, Default, Clone, Copy)]
pub struct BilinearResampler;

impl Resampler for BilinearResampler {
    fn resample(&self, plane: &Plane, target: WorkingSize) -> Plane {
        if plane.size() == target {
            return plane.clone();
        }

        let src_w = plane.width();
        let src_h = plane.height();
        let scale_x = src_w as f64 / target.width as f64;
        let scale_y = src_h as f64 / target.height as f64;
        let src = plane.data();

        let mut data = vec![0.0; target.pixel_count()];
        data.par_chunks_mut(target.width)
            .enumerate()
            .for_each(|(y, row)| {
                let (y0, y1, fy) = source_coords(y, scale_y, src_h);
                for (x, out) in row.iter_mut().enumerate() {
                    let (x0, x1, fx) = source_coords(x, scale_x, src_w);
                    let top = src[y0 * src_w + x0] * (1.0 - fx) + src[y0 * src_w + x1] * fx;
                    let bottom = src[y1 * src_w + x0] * (1.0 - fx) + src[y1 * src_w + x1] * fx;
                    *out = top * (1.0 - fy) + bottom * fy;
                }
            });

        Plane::from_raw(target, data)
    }
}

/// Maps a destination index onto its two source neighbours and blend weight.
#[inline]
fn source_coords(dst: usize, scale: f64, src_len: usize) -> (usize, usize, f64) {
    let max = (src_len - 1) as f64;
    let pos = ((dst as f64 + 0.5) * scale - 0.5).clamp(0.0, max);
    let i0 = pos.floor() as usize;
    let i1 = (i0 + 1).min(src_len - 1);
    (i0, i1, pos - i0 as f64)
}
