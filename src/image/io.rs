//! Conversions between `Raster` and the `image` crate's buffer types.
//!
//! Available when the `image-io` feature is enabled. Decoding normalizes
//! everything to 8-bit RGB; encoding picks the color type from the raster's
//! channel count.

use crate::image::Raster;
use crate::util::{AlignError, AlignResult};
use std::path::Path;

/// Converts a decoded dynamic image into an RGB raster.
pub fn raster_from_dynamic(img: &image::DynamicImage) -> AlignResult<Raster> {
    let rgb = img.to_rgb8();
    let width = rgb.width() as usize;
    let height = rgb.height() as usize;
    Raster::from_vec(rgb.into_raw(), width, height, 3)
}

/// Loads an image from disk as an RGB raster.
pub fn load_raster<P: AsRef<Path>>(path: P) -> AlignResult<Raster> {
    let img = image::open(path).map_err(|err| AlignError::ImageIo {
        reason: err.to_string(),
    })?;
    raster_from_dynamic(&img)
}

/// Writes a raster to disk; the format is inferred from the extension.
pub fn save_raster<P: AsRef<Path>>(path: P, raster: &Raster) -> AlignResult<()> {
    let color = match raster.channels() {
        1 => image::ExtendedColorType::L8,
        3 => image::ExtendedColorType::Rgb8,
        channels => return Err(AlignError::InvalidChannels { channels }),
    };
    image::save_buffer(
        path,
        raster.data(),
        raster.width() as u32,
        raster.height() as u32,
        color,
    )
    .map_err(|err| AlignError::ImageIo {
        reason: err.to_string(),
    })
}
