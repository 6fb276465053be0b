//! RANSAC homography fitting over putative correspondences.
//!
//! Minimal 4-point samples are drawn from a seeded ChaCha8 generator, so a
//! fixed input and configuration always produce the same model. The
//! iteration budget shrinks adaptively as the observed inlier ratio rises,
//! and the winning model is refined by a full DLT refit on its inliers.

use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::geometry::{dlt, Homography};

const SAMPLE_SIZE: usize = 4;

/// Robust-estimation tuning knobs.
#[derive(Debug, Clone)]
pub struct RansacConfig {
    /// Upper bound on hypothesis iterations.
    pub max_iterations: usize,
    /// Inlier reprojection threshold in pixels.
    pub reproj_threshold: f64,
    /// Target confidence for adaptive early termination.
    pub confidence: f64,
    /// Seed for the hypothesis sampler.
    pub seed: u64,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            reproj_threshold: 5.0,
            confidence: 0.995,
            seed: 0,
        }
    }
}

/// A fitted homography and the correspondences consistent with it.
#[derive(Debug, Clone)]
pub struct RansacResult {
    pub homography: Homography,
    /// Indices into the input correspondence list classified as inliers.
    pub inliers: Vec<usize>,
}

/// Fits a homography mapping `src` points onto `dst` points.
///
/// Returns `None` when fewer than 4 correspondences are given, when no
/// sampled hypothesis reaches consensus, or when every candidate model is
/// degenerate. Both point slices must be index-aligned.
pub fn fit_homography(
    src: &[(f64, f64)],
    dst: &[(f64, f64)],
    cfg: &RansacConfig,
) -> Option<RansacResult> {
    let n = src.len();
    if n < SAMPLE_SIZE || dst.len() != n {
        return None;
    }

    let thr_sq = cfg.reproj_threshold * cfg.reproj_threshold;
    let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);

    let mut best: Option<(Homography, Vec<usize>)> = None;
    let mut budget = cfg.max_iterations;
    let mut iteration = 0;

    let mut sample_src = [(0.0, 0.0); SAMPLE_SIZE];
    let mut sample_dst = [(0.0, 0.0); SAMPLE_SIZE];

    while iteration < budget {
        iteration += 1;

        for (slot, idx) in index::sample(&mut rng, n, SAMPLE_SIZE).iter().enumerate() {
            sample_src[slot] = src[idx];
            sample_dst[slot] = dst[idx];
        }

        let Some(candidate) = dlt::estimate(&sample_src, &sample_dst) else {
            continue;
        };
        if candidate.inverse().is_none() {
            continue;
        }

        let inliers = consensus(src, dst, &candidate, thr_sq);
        let improved = match &best {
            Some((_, current)) => inliers.len() > current.len(),
            None => inliers.len() >= SAMPLE_SIZE,
        };
        if improved {
            let ratio = inliers.len() as f64 / n as f64;
            budget = budget.min(adaptive_iterations(ratio, SAMPLE_SIZE, cfg.confidence));
            best = Some((candidate, inliers));
        }
    }

    let (mut homography, mut inliers) = best?;

    // Refit on the full inlier set; keep the refinement only when it does
    // not lose consensus.
    let refit_src: Vec<_> = inliers.iter().map(|&i| src[i]).collect();
    let refit_dst: Vec<_> = inliers.iter().map(|&i| dst[i]).collect();
    if let Some(refined) = dlt::estimate(&refit_src, &refit_dst) {
        if refined.inverse().is_some() {
            let refined_inliers = consensus(src, dst, &refined, thr_sq);
            if refined_inliers.len() >= inliers.len() {
                homography = refined;
                inliers = refined_inliers;
            }
        }
    }

    Some(RansacResult {
        homography,
        inliers,
    })
}

fn consensus(src: &[(f64, f64)], dst: &[(f64, f64)], h: &Homography, thr_sq: f64) -> Vec<usize> {
    src.iter()
        .zip(dst.iter())
        .enumerate()
        .filter_map(|(i, (&(x, y), &(u, v)))| {
            let (px, py) = h.project(x, y)?;
            let err = (px - u).powi(2) + (py - v).powi(2);
            (err <= thr_sq).then_some(i)
        })
        .collect()
}

/// Iterations needed to draw an all-inlier sample with the given confidence:
/// `N = log(1 - confidence) / log(1 - w^s)`.
fn adaptive_iterations(inlier_ratio: f64, sample_size: usize, confidence: f64) -> usize {
    if inlier_ratio <= 0.0 {
        return usize::MAX;
    }
    let w_s = inlier_ratio.powi(sample_size as i32);
    if w_s >= 1.0 {
        return 1;
    }
    let denom = (1.0 - w_s).ln();
    if denom >= 0.0 {
        return usize::MAX;
    }
    ((1.0 - confidence).ln() / denom).ceil() as usize
}
