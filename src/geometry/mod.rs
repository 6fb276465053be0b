//! Planar projective geometry: homography representation and robust fitting.

use nalgebra::Matrix3;

pub(crate) mod dlt;
mod ransac;

pub use ransac::{fit_homography, RansacConfig, RansacResult};

/// A 3x3 projective transform mapping source pixels to destination pixels,
/// defined up to scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    m: Matrix3<f64>,
}

impl Homography {
    /// Wraps a matrix, rejecting non-finite entries and zero matrices.
    pub(crate) fn from_matrix(m: Matrix3<f64>) -> Option<Self> {
        if m.iter().any(|v| !v.is_finite()) {
            return None;
        }
        if m.iter().all(|v| v.abs() < 1e-12) {
            return None;
        }
        Some(Self { m })
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            m: Matrix3::identity(),
        }
    }

    /// Builds a transform from row-major entries.
    ///
    /// Returns `None` for non-finite or all-zero matrices.
    pub fn from_array(m: [[f64; 3]; 3]) -> Option<Self> {
        Self::from_matrix(Matrix3::new(
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        ))
    }

    /// Maps `(x, y)` through the transform with a homogeneous divide.
    ///
    /// Returns `None` for points at or numerically near the line at
    /// infinity.
    pub fn project(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let w = self.m[(2, 0)] * x + self.m[(2, 1)] * y + self.m[(2, 2)];
        if w.abs() < 1e-12 {
            return None;
        }
        let u = (self.m[(0, 0)] * x + self.m[(0, 1)] * y + self.m[(0, 2)]) / w;
        let v = (self.m[(1, 0)] * x + self.m[(1, 1)] * y + self.m[(1, 2)]) / w;
        if !u.is_finite() || !v.is_finite() {
            return None;
        }
        Some((u, v))
    }

    /// Returns the inverse transform, if the matrix is invertible.
    pub fn inverse(&self) -> Option<Homography> {
        self.m.try_inverse().and_then(Self::from_matrix)
    }

    /// Returns the matrix entries in row-major order.
    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.m[(0, 0)], self.m[(0, 1)], self.m[(0, 2)]],
            [self.m[(1, 0)], self.m[(1, 1)], self.m[(1, 2)]],
            [self.m[(2, 0)], self.m[(2, 1)], self.m[(2, 2)]],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_projects_points_unchanged() {
        let h = Homography::identity();
        assert_eq!(h.project(3.5, -2.0), Some((3.5, -2.0)));
    }

    #[test]
    fn translation_shifts_points() {
        let m = Matrix3::new(1.0, 0.0, 10.0, 0.0, 1.0, -4.0, 0.0, 0.0, 1.0);
        let h = Homography::from_matrix(m).unwrap();
        assert_eq!(h.project(1.0, 2.0), Some((11.0, -2.0)));
    }

    #[test]
    fn inverse_round_trips() {
        let m = Matrix3::new(1.2, 0.1, 5.0, -0.05, 0.9, 3.0, 1e-4, -2e-4, 1.0);
        let h = Homography::from_matrix(m).unwrap();
        let inv = h.inverse().unwrap();
        let (u, v) = h.project(7.0, 11.0).unwrap();
        let (x, y) = inv.project(u, v).unwrap();
        assert!((x - 7.0).abs() < 1e-9);
        assert!((y - 11.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_matrix_is_rejected() {
        let m = Matrix3::new(f64::NAN, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert!(Homography::from_matrix(m).is_none());
    }
}
