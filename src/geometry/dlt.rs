//! Direct linear transform estimation with Hartley normalization.
//!
//! Both point sets are translated to their centroid and scaled so the mean
//! distance from it is sqrt(2) before the homogeneous system is solved; the
//! result is denormalized as `H = T_dst^-1 * H_n * T_src`. Working on raw
//! pixel coordinates would square the condition number and lose precision
//! for image-sized coordinates.

use nalgebra::{DMatrix, Matrix3, SVD};

use crate::geometry::Homography;

/// Estimates a homography mapping `src` points onto `dst` points.
///
/// Requires at least 4 correspondences. Returns `None` for degenerate
/// configurations (coincident points, unsolvable systems).
pub(crate) fn estimate(src: &[(f64, f64)], dst: &[(f64, f64)]) -> Option<Homography> {
    let n = src.len();
    if n < 4 || dst.len() != n {
        return None;
    }

    let (src_norm, t_src) = normalize(src)?;
    let (dst_norm, t_dst) = normalize(dst)?;

    // Each correspondence contributes two rows of the 2n x 9 system Ah = 0:
    // [-x -y -1  0  0  0  x*u  y*u  u]
    // [ 0  0  0 -x -y -1  x*v  y*v  v]
    let mut a = DMatrix::<f64>::zeros(2 * n, 9);
    for (i, (&(x, y), &(u, v))) in src_norm.iter().zip(dst_norm.iter()).enumerate() {
        let r = 2 * i;
        a[(r, 0)] = -x;
        a[(r, 1)] = -y;
        a[(r, 2)] = -1.0;
        a[(r, 6)] = x * u;
        a[(r, 7)] = y * u;
        a[(r, 8)] = u;

        a[(r + 1, 3)] = -x;
        a[(r + 1, 4)] = -y;
        a[(r + 1, 5)] = -1.0;
        a[(r + 1, 6)] = x * v;
        a[(r + 1, 7)] = y * v;
        a[(r + 1, 8)] = v;
    }

    let h_norm = solve_null_space(a)?;
    let denorm = t_dst.try_inverse()? * h_norm * t_src;

    // Fix the scale so h22 = 1; a homography between image planes has a
    // nonzero lower-right entry for any finite mapping of the origin area.
    let scale = denorm[(2, 2)];
    if scale.abs() < 1e-10 {
        return None;
    }
    Homography::from_matrix(denorm / scale)
}

/// Solves `Ah = 0` for the 9-vector `h` via SVD, returned as a 3x3 matrix.
fn solve_null_space(a: DMatrix<f64>) -> Option<Matrix3<f64>> {
    // nalgebra computes a thin SVD, so an 8x9 system would not expose the
    // null-space vector. Padding with zero rows leaves the null space
    // unchanged and makes V^T square.
    let a = if a.nrows() < a.ncols() {
        let (rows, cols) = (a.nrows(), a.ncols());
        let mut padded = DMatrix::zeros(cols, cols);
        padded.view_mut((0, 0), (rows, cols)).copy_from(&a);
        padded
    } else {
        a
    };

    let svd = SVD::new(a, false, true);
    let v_t = svd.v_t?;
    let smallest = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)?;

    let h = v_t.row(smallest);
    Some(Matrix3::new(
        h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8],
    ))
}

/// Hartley normalization: centroid to origin, mean distance to sqrt(2).
fn normalize(points: &[(f64, f64)]) -> Option<(Vec<(f64, f64)>, Matrix3<f64>)> {
    let n = points.len() as f64;
    let (cx, cy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
    let (cx, cy) = (cx / n, cy / n);

    let mean_dist = points
        .iter()
        .map(|&(x, y)| ((x - cx).powi(2) + (y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    if mean_dist < 1e-10 {
        return None;
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    let normalized = points
        .iter()
        .map(|&(x, y)| ((x - cx) * s, (y - cy) * s))
        .collect();
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    Some((normalized, t))
}
