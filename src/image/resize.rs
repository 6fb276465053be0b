//! Uniform bilinear resampling.
//!
//! This is the fallback path of the alignment engine: a plain stretch of the
//! thermal raster to the RGB dimensions, aspect ratio not preserved. Source
//! coordinates use pixel-center mapping (`sx = (x + 0.5) * w_src / w_dst -
//! 0.5`) so up- and downscaling stay symmetric around the image center.

use crate::image::Raster;
use crate::util::{AlignError, AlignResult};

/// Resizes a raster to `dst_width` x `dst_height` with bilinear interpolation.
pub fn resize_bilinear(src: &Raster, dst_width: usize, dst_height: usize) -> AlignResult<Raster> {
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
    let max_x = src_width as f32 - 1.0;
    let max_y = src_height as f32 - 1.0;
    let scale_x = src_width as f32 / dst_width as f32;
    let scale_y = src_height as f32 / dst_height as f32;

    let mut out = vec![0u8; dst_width * dst_height * channels];
    for y in 0..dst_height {
        let src_y = ((y as f32 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
        let y0 = src_y.floor() as usize;
        let y1 = (y0 + 1).min(src_height - 1);
        let fy = src_y - y0 as f32;

        for x in 0..dst_width {
            let src_x = ((x as f32 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
            let x0 = src_x.floor() as usize;
            let x1 = (x0 + 1).min(src_width - 1);
            let fx = src_x - x0 as f32;

            let w00 = (1.0 - fx) * (1.0 - fy);
            let w10 = fx * (1.0 - fy);
            let w01 = (1.0 - fx) * fy;
            let w11 = fx * fy;

            let dst_base = (y * dst_width + x) * channels;
            for c in 0..channels {
                let a = src_data[(y0 * src_width + x0) * channels + c] as f32;
                let b = src_data[(y0 * src_width + x1) * channels + c] as f32;
                let d = src_data[(y1 * src_width + x0) * channels + c] as f32;
                let e = src_data[(y1 * src_width + x1) * channels + c] as f32;
                let value = a * w00 + b * w10 + d * w01 + e * w11;
                out[dst_base + c] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    Raster::from_vec(out, dst_width, dst_height, channels)
}
