//! ORB-class feature extraction.
//!
//! Keypoints come from FAST-9 corners detected over a small image pyramid,
//! oriented by the intensity centroid of their neighborhood, and described
//! with steered 256-bit BRIEF descriptors. Coordinates are always reported
//! in base-image pixel space.

use crate::image::{resize::resize_bilinear, ImageView, Raster};
use crate::util::AlignResult;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

pub(crate) mod brief;
pub(crate) mod fast;

/// Pyramid levels smaller than this on either side are not built.
const MIN_LEVEL_SIZE: usize = 40;

/// Radius of the intensity-centroid disc used for orientation.
const ORIENTATION_RADIUS: i32 = 15;

/// A detected corner in base-image pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Corner strength; used only to rank keypoints under the cap.
    pub response: f32,
    /// Orientation in radians.
    pub angle: f32,
    /// Pyramid level the keypoint was detected on.
    pub octave: u8,
    /// Factor mapping level coordinates back to base coordinates.
    pub scale: f32,
}

/// 256-bit binary descriptor compared by Hamming distance.
pub type Descriptor = [u8; 32];

/// Keypoints and descriptors for one image, index-aligned.
#[derive(Debug, Clone, Default)]
pub struct Features {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
}

impl Features {
    /// Number of detected keypoints.
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    /// True when no keypoints were detected.
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// Detector tuning knobs.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// FAST segment-test threshold.
    pub fast_threshold: u8,
    /// Keypoint cap across all pyramid levels.
    pub max_features: usize,
    /// Number of pyramid levels to attempt.
    pub pyramid_levels: usize,
    /// Downsampling factor between consecutive levels.
    pub scale_factor: f32,
    /// Non-maximum-suppression cell radius in pixels.
    pub nms_radius: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            fast_threshold: 20,
            max_features: 2000,
            pyramid_levels: 4,
            scale_factor: 1.5,
            nms_radius: 5.0,
        }
    }
}

struct PyramidLevel {
    image: Raster,
    scale: f32,
    octave: u8,
}

/// Detects keypoints and computes their descriptors.
///
/// Multi-channel rasters are converted to luminance internally. The result
/// is deterministic for a fixed input and configuration.
pub fn detect_and_describe(image: &Raster, cfg: &DetectorConfig) -> AlignResult<Features> {
    let gray_owned;
    let gray = if image.channels() == 1 {
        image
    } else {
        gray_owned = image.to_gray();
        &gray_owned
    };

    let pyramid = build_pyramid(gray, cfg)?;
    let per_level = extract_levels(&pyramid, cfg)?;

    let mut tagged: Vec<(Keypoint, Descriptor)> = per_level
        .into_iter()
        .flat_map(|(kps, descs)| kps.into_iter().zip(descs))
        .collect();
    tagged.sort_by(|(a, _), (b, _)| {
        b.response
            .partial_cmp(&a.response)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| (a.octave, a.y as u32, a.x as u32).cmp(&(b.octave, b.y as u32, b.x as u32)))
    });
    tagged.truncate(cfg.max_features);

    let (keypoints, descriptors) = tagged.into_iter().unzip();
    Ok(Features {
        keypoints,
        descriptors,
    })
}

fn build_pyramid(gray: &Raster, cfg: &DetectorConfig) -> AlignResult<Vec<PyramidLevel>> {
    let mut levels = vec![PyramidLevel {
        image: gray.clone(),
        scale: 1.0,
        octave: 0,
    }];

    for octave in 1..cfg.pyramid_levels {
        let prev = &levels[levels.len() - 1];
        let next_width = (prev.image.width() as f32 / cfg.scale_factor) as usize;
        let next_height = (prev.image.height() as f32 / cfg.scale_factor) as usize;
        if next_width < MIN_LEVEL_SIZE || next_height < MIN_LEVEL_SIZE {
            break;
        }
        let scale = prev.scale * cfg.scale_factor;
        let image = resize_bilinear(&prev.image, next_width, next_height)?;
        levels.push(PyramidLevel {
            image,
            scale,
            octave: octave as u8,
        });
    }
    Ok(levels)
}

#[cfg(feature = "rayon")]
fn extract_levels(
    levels: &[PyramidLevel],
    cfg: &DetectorConfig,
) -> AlignResult<Vec<(Vec<Keypoint>, Vec<Descriptor>)>> {
    levels
        .par_iter()
        .map(|level| extract_level(level, cfg))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn extract_levels(
    levels: &[PyramidLevel],
    cfg: &DetectorConfig,
) -> AlignResult<Vec<(Vec<Keypoint>, Vec<Descriptor>)>> {
    levels
        .iter()
        .map(|level| extract_level(level, cfg))
        .collect()
}

fn extract_level(
    level: &PyramidLevel,
    cfg: &DetectorConfig,
) -> AlignResult<(Vec<Keypoint>, Vec<Descriptor>)> {
    let view = ImageView::from_raster(&level.image)?;
    let corners = fast::detect(view, cfg.fast_threshold);
    let corners = fast::suppress(corners, cfg.nms_radius, cfg.max_features);

    let mut keypoints = Vec::with_capacity(corners.len());
    let mut descriptors = Vec::with_capacity(corners.len());
    for corner in corners {
        let angle = intensity_centroid_angle(view, corner.x as i32, corner.y as i32);
        descriptors.push(brief::describe(view, corner.x as f32, corner.y as f32, angle));
        keypoints.push(Keypoint {
            x: corner.x as f32 * level.scale,
            y: corner.y as f32 * level.scale,
            response: corner.response,
            angle,
            octave: level.octave,
            scale: level.scale,
        });
    }
    Ok((keypoints, descriptors))
}

/// Orientation from the first-order moments of a radius-limited disc.
fn intensity_centroid_angle(view: ImageView<'_>, x: i32, y: i32) -> f32 {
    let width = view.width() as i32;
    let height = view.height() as i32;
    let mut m01 = 0.0f32;
    let mut m10 = 0.0f32;

    for dy in -ORIENTATION_RADIUS..=ORIENTATION_RADIUS {
        for dx in -ORIENTATION_RADIUS..=ORIENTATION_RADIUS {
            if dx * dx + dy * dy > ORIENTATION_RADIUS * ORIENTATION_RADIUS {
                continue;
            }
            let px = x + dx;
            let py = y + dy;
            if px < 0 || py < 0 || px >= width || py >= height {
                continue;
            }
            let value = view.as_slice()[py as usize * view.stride() + px as usize] as f32;
            m01 += value * dy as f32;
            m10 += value * dx as f32;
        }
    }
    m01.atan2(m10)
}
