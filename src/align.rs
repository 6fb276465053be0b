//! The alignment pipeline.
//!
//! Runs extract, match, estimate, warp as an explicit state machine with
//! early exits to the uniform-resize fallback. Every geometric failure is
//! recovered locally: for valid inputs the pipeline always produces an
//! output raster sized to the RGB image, never an error.

use crate::feature::{detect_and_describe, DetectorConfig, Features};
use crate::geometry::{fit_homography, Homography, RansacConfig};
use crate::image::{resize::resize_bilinear, Raster};
use crate::matching::{match_descriptors, Correspondence};
use crate::util::AlignResult;
use crate::warp::warp_perspective;

/// Fewer keypoints than this in either image routes to the fallback.
const MIN_KEYPOINTS: usize = 4;

/// Why the geometric path was abandoned for the uniform resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Fewer than four keypoints or no descriptors in one of the images.
    DegenerateInput,
    /// Good-match count below the configured minimum.
    InsufficientCorrespondence,
    /// The robust estimator produced no usable homography.
    ModelFitFailure,
}

/// Engine configuration with the reference defaults.
#[derive(Debug, Clone)]
pub struct AlignConfig {
    pub detector: DetectorConfig,
    /// Lowe ratio-test threshold.
    pub ratio_threshold: f32,
    /// Good matches required before a homography fit is attempted.
    pub min_good_matches: usize,
    pub ransac: RansacConfig,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            ratio_threshold: 0.75,
            min_good_matches: 10,
            ransac: RansacConfig::default(),
        }
    }
}

/// Pipeline control states; `Fallback` routes into the resize terminal.
enum State {
    Extract,
    Match(Features, Features),
    Estimate(Features, Features, Vec<Correspondence>),
    Warp(Homography),
    Fallback(FallbackReason),
    Done(Raster),
}

/// Aligns `thermal` onto the pixel grid of `rgb` with default settings.
///
/// The output raster always has `rgb`'s width and height and `thermal`'s
/// channel count, whichever path produced it.
pub fn align(thermal: &Raster, rgb: &Raster) -> AlignResult<Raster> {
    align_with_config(thermal, rgb, &AlignConfig::default())
}

/// Aligns `thermal` onto the pixel grid of `rgb`.
pub fn align_with_config(
    thermal: &Raster,
    rgb: &Raster,
    cfg: &AlignConfig,
) -> AlignResult<Raster> {
    let _span = tracing::info_span!(
        "align",
        thermal_width = thermal.width(),
        thermal_height = thermal.height(),
        rgb_width = rgb.width(),
        rgb_height = rgb.height(),
    )
    .entered();

    let mut state = State::Extract;
    loop {
        state = match state {
            State::Extract => {
                let thermal_features = detect_and_describe(thermal, &cfg.detector)?;
                let rgb_features = detect_and_describe(rgb, &cfg.detector)?;
                tracing::debug!(
                    thermal = thermal_features.len(),
                    rgb = rgb_features.len(),
                    "keypoints detected"
                );
                match feature_gate(&thermal_features, &rgb_features) {
                    Ok(()) => State::Match(thermal_features, rgb_features),
                    Err(reason) => State::Fallback(reason),
                }
            }
            State::Match(thermal_features, rgb_features) => {
                let matches = match_descriptors(
                    &thermal_features.descriptors,
                    &rgb_features.descriptors,
                    cfg.ratio_threshold,
                );
                tracing::debug!(good = matches.len(), "ratio-test survivors");
                match match_gate(matches.len(), cfg.min_good_matches) {
                    Ok(()) => State::Estimate(thermal_features, rgb_features, matches),
                    Err(reason) => State::Fallback(reason),
                }
            }
            State::Estimate(thermal_features, rgb_features, matches) => {
                let (src, dst) = correspondence_points(&thermal_features, &rgb_features, &matches);
                match fit_homography(&src, &dst, &cfg.ransac) {
                    Some(fit) => {
                        tracing::debug!(
                            inliers = fit.inliers.len(),
                            matches = matches.len(),
                            "homography accepted"
                        );
                        State::Warp(fit.homography)
                    }
                    None => State::Fallback(FallbackReason::ModelFitFailure),
                }
            }
            State::Warp(homography) => {
                match warp_perspective(thermal, &homography, rgb.width(), rgb.height()) {
                    Some(warped) => State::Done(warped?),
                    None => State::Fallback(FallbackReason::ModelFitFailure),
                }
            }
            State::Fallback(reason) => {
                tracing::info!(?reason, "falling back to uniform resize");
                State::Done(resize_bilinear(thermal, rgb.width(), rgb.height())?)
            }
            State::Done(out) => return Ok(out),
        };
    }
}

/// Degenerate-input gate after extraction.
fn feature_gate(thermal: &Features, rgb: &Features) -> Result<(), FallbackReason> {
    if thermal.keypoints.len() < MIN_KEYPOINTS || rgb.keypoints.len() < MIN_KEYPOINTS {
        return Err(FallbackReason::DegenerateInput);
    }
    if thermal.descriptors.is_empty() || rgb.descriptors.is_empty() {
        return Err(FallbackReason::DegenerateInput);
    }
    Ok(())
}

/// Correspondence-count gate after matching. Exactly `min_good` matches
/// still attempt the geometric path.
fn match_gate(good: usize, min_good: usize) -> Result<(), FallbackReason> {
    if good < min_good {
        return Err(FallbackReason::InsufficientCorrespondence);
    }
    Ok(())
}

fn correspondence_points(
    thermal: &Features,
    rgb: &Features,
    matches: &[Correspondence],
) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    matches
        .iter()
        .map(|m| {
            let q = &thermal.keypoints[m.query_idx];
            let t = &rgb.keypoints[m.train_idx];
            ((q.x as f64, q.y as f64), (t.x as f64, t.y as f64))
        })
        .unzip()
}
