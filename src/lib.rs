//! Thermal-to-RGB image alignment.
//!
//! `thermalign` registers a thermal image onto the pixel grid of a
//! visible-light image of the same scene so the two can be overlaid
//! pixel-for-pixel: ORB-class feature extraction, Hamming matching with a
//! ratio filter, RANSAC homography fitting, and perspective warping. When
//! the geometric path cannot produce a confident model the engine degrades
//! to a deterministic uniform resize, so valid inputs always yield an
//! aligned image.

pub mod align;
pub mod feature;
pub mod geometry;
pub mod image;
pub mod matching;
pub mod util;
pub mod warp;

pub use align::{align, align_with_config, AlignConfig, FallbackReason};
pub use feature::{detect_and_describe, Descriptor, DetectorConfig, Features, Keypoint};
pub use geometry::{fit_homography, Homography, RansacConfig, RansacResult};
pub use image::resize::resize_bilinear;
pub use image::{ImageView, Raster};
pub use matching::{hamming_distance, match_descriptors, Correspondence};
pub use util::{AlignError, AlignResult};
pub use warp::warp_perspective;

#[cfg(feature = "image-io")]
pub use image::io;
