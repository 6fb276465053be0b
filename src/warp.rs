//! Perspective resampling of a raster through a homography.
//!
//! Each destination pixel is inverse-mapped into source coordinates and
//! sampled bilinearly per channel; samples outside the source bounds are
//! filled with zero. The forward homography maps source pixels to
//! destination pixels, so warping uses its inverse.

use crate::geometry::Homography;
use crate::image::Raster;
use crate::util::{AlignError, AlignResult};

const BOUNDS_EPSILON: f64 = 1e-6;

/// Warps `src` into a `dst_width` x `dst_height` raster through `h`.
///
/// Returns `None` when the homography is not invertible; the caller treats
/// that as a failed fit.
pub fn warp_perspective(
    src: &Raster,
    h: &Homography,
    dst_width: usize,
    dst_height: usize,
) -> Option<AlignResult<Raster>> {
    let inverse = h.inverse()?;
    Some(warp_inverse_mapped(src, &inverse, dst_width, dst_height))
}

fn warp_inverse_mapped(
    src: &Raster,
    inverse: &Homography,
    dst_width: usize,
    dst_height: usize,
) -> AlignResult<Raster> {
    if dst_width == 0 || dst_height == 0 {
        return Err(AlignError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        });
    }

    let channels = src.channels();
    let src_data = src.data();
    let src_width = src.width();
    let src_height = src.height();
    let max_x = src_width as f64 - 1.0;
    let max_y = src_height as f64 - 1.0;

    let mut out = vec![0u8; dst_width * dst_height * channels];
    for y in 0..dst_height {
        for x in 0..dst_width {
            let Some((sx, sy)) = inverse.project(x as f64, y as f64) else {
                continue;
            };
            if sx < -BOUNDS_EPSILON
                || sy < -BOUNDS_EPSILON
                || sx > max_x + BOUNDS_EPSILON
                || sy > max_y + BOUNDS_EPSILON
            {
                continue;
            }

            let sx = sx.clamp(0.0, max_x);
            let sy = sy.clamp(0.0, max_y);
            let x0 = sx.floor() as usize;
            let y0 = sy.floor() as usize;
            let x1 = (x0 + 1).min(src_width - 1);
            let y1 = (y0 + 1).min(src_height - 1);
            let fx = sx - x0 as f64;
            let fy = sy - y0 as f64;

            let w00 = (1.0 - fx) * (1.0 - fy);
            let w10 = fx * (1.0 - fy);
            let w01 = (1.0 - fx) * fy;
            let w11 = fx * fy;

            let dst_base = (y * dst_width + x) * channels;
            for c in 0..channels {
                let a = src_data[(y0 * src_width + x0) * channels + c] as f64;
                let b = src_data[(y0 * src_width + x1) * channels + c] as f64;
                let d = src_data[(y1 * src_width + x0) * channels + c] as f64;
                let e = src_data[(y1 * src_width + x1) * channels + c] as f64;
                let value = a * w00 + b * w10 + d * w01 + e * w11;
                out[dst_base + c] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    Raster::from_vec(out, dst_width, dst_height, channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    fn textured(width: usize, height: usize) -> Raster {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push((((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF) as u8);
            }
        }
        Raster::from_vec(data, width, height, 1).unwrap()
    }

    #[test]
    fn identity_warp_copies_pixels() {
        let src = textured(32, 24);
        let out = warp_perspective(&src, &Homography::identity(), 32, 24)
            .unwrap()
            .unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn integer_translation_shifts_content() {
        let src = textured(32, 24);
        // Forward map: (x, y) -> (x + 6, y + 3).
        let h = Homography::from_matrix(Matrix3::new(
            1.0, 0.0, 6.0, 0.0, 1.0, 3.0, 0.0, 0.0, 1.0,
        ))
        .unwrap();
        let out = warp_perspective(&src, &h, 32, 24).unwrap().unwrap();
        for y in 3..24 {
            for x in 6..32 {
                assert_eq!(out.sample(x, y, 0), src.sample(x - 6, y - 3, 0));
            }
        }
        // The uncovered band is zero-filled.
        assert_eq!(out.sample(2, 10, 0), Some(0));
        assert_eq!(out.sample(10, 1, 0), Some(0));
    }

    #[test]
    fn output_takes_destination_dimensions() {
        let src = textured(20, 20);
        let out = warp_perspective(&src, &Homography::identity(), 50, 11)
            .unwrap()
            .unwrap();
        assert_eq!(out.width(), 50);
        assert_eq!(out.height(), 11);
    }

    #[test]
    fn warp_preserves_channel_count() {
        let gray = textured(16, 16);
        let mut rgb = Vec::with_capacity(16 * 16 * 3);
        for &v in gray.data() {
            rgb.extend_from_slice(&[v, v.wrapping_add(1), v.wrapping_add(2)]);
        }
        let src = Raster::from_vec(rgb, 16, 16, 3).unwrap();
        let out = warp_perspective(&src, &Homography::identity(), 16, 16)
            .unwrap()
            .unwrap();
        assert_eq!(out.channels(), 3);
        assert_eq!(out, src);
    }
}
