//! Descriptor matching with a ratio-test filter.
//!
//! For every query descriptor the matcher finds its two nearest neighbors in
//! the train set by Hamming distance and keeps the best candidate only when
//! it is clearly better than the runner-up (Lowe's ratio test). Queries with
//! fewer than two candidates cannot be disambiguated and are dropped.

use crate::feature::Descriptor;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// An accepted correspondence between two descriptor sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correspondence {
    /// Index into the query (thermal) keypoint set.
    pub query_idx: usize,
    /// Index into the train (RGB) keypoint set.
    pub train_idx: usize,
    /// Hamming distance of the accepted pair.
    pub distance: u32,
}

/// Hamming distance between two 256-bit descriptors.
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum()
}

/// Matches `query` against `train`, keeping ratio-test survivors.
///
/// Output order follows query order, so the result is deterministic whether
/// or not the `rayon` feature parallelizes the scan.
#[cfg(feature = "rayon")]
pub fn match_descriptors(
    query: &[Descriptor],
    train: &[Descriptor],
    ratio: f32,
) -> Vec<Correspondence> {
    query
        .par_iter()
        .enumerate()
        .filter_map(|(query_idx, desc)| best_survivor(query_idx, desc, train, ratio))
        .collect()
}

/// Matches `query` against `train`, keeping ratio-test survivors.
///
/// Output order follows query order, so the result is deterministic whether
/// or not the `rayon` feature parallelizes the scan.
#[cfg(not(feature = "rayon"))]
pub fn match_descriptors(
    query: &[Descriptor],
    train: &[Descriptor],
    ratio: f32,
) -> Vec<Correspondence> {
    query
        .iter()
        .enumerate()
        .filter_map(|(query_idx, desc)| best_survivor(query_idx, desc, train, ratio))
        .collect()
}

fn best_survivor(
    query_idx: usize,
    desc: &Descriptor,
    train: &[Descriptor],
    ratio: f32,
) -> Option<Correspondence> {
    if train.len() < 2 {
        return None;
    }

    let mut best = u32::MAX;
    let mut second = u32::MAX;
    let mut best_idx = 0usize;
    for (train_idx, candidate) in train.iter().enumerate() {
        let distance = hamming_distance(desc, candidate);
        if distance < best {
            second = best;
            best = distance;
            best_idx = train_idx;
        } else if distance < second {
            second = distance;
        }
    }

    if (best as f32) < ratio * (second as f32) {
        Some(Correspondence {
            query_idx,
            train_idx: best_idx,
            distance: best,
        })
    } else {
        None
    }
}
