//! First-order covariance propagation through per-point Jacobians.
//!
//! For a local linear map `J` the propagated covariance is `C' = J·C·Jᵀ`.
//! The result is symmetric whenever `C` is, regardless of `J`.

use crate::Matrix2;

/// Propagate a single covariance: `J·C·Jᵀ`.
#[inline]
pub fn propagate_one(jac: &Matrix2, cov: &Matrix2) -> Matrix2 {
    jac * cov * jac.transpose()
}

/// Propagate a covariance field through a batch of Jacobians.
///
/// Returns an empty vector if either input is empty or the two batches
/// differ in length.
pub fn propagate(jacobians: &[Matrix2], covariance: &[Matrix2]) -> Vec<Matrix2> {
    if jacobians.is_empty() || jacobians.len() != covariance.len() {
        return Vec::new();
    }
    jacobians
        .iter()
        .zip(covariance)
        .map(|(j, c)| propagate_one(j, c))
        .collect()
}

/// Compose two Jacobian batches point by point: `outer · inner`.
///
/// `inner` is the Jacobian of the transform applied first. Returns an
/// empty vector on a length mismatch.
pub fn compose(outer: &[Matrix2], inner: &[Matrix2]) -> Vec<Matrix2> {
    if outer.len() != inner.len() {
        return Vec::new();
    }
    outer.iter().zip(inner).map(|(o, i)| o * i).collect()
}

/// Apply each Jacobian to the same displacement `(dx, dy)`.
pub fn apply(jacobians: &[Matrix2], dx: f64, dy: f64) -> Vec<(f64, f64)> {
    jacobians
        .iter()
        .map(|j| (j[(0, 0)] * dx + j[(0, 1)] * dy, j[(1, 0)] * dx + j[(1, 1)] * dy))
        .collect()
}

/// Determinant of each Jacobian (local area scale of the map).
pub fn determinants(jacobians: &[Matrix2]) -> Vec<f64> {
    jacobians.iter().map(|j| j.determinant()).collect()
}

/// Largest absolute asymmetry `|C01 - C10|` across a covariance field.
pub fn max_asymmetry(covariance: &[Matrix2]) -> f64 {
    covariance
        .iter()
        .map(|c| (c[(0, 1)] - c[(1, 0)]).abs())
        .fold(0.0, f64::max)
}

/// Build a covariance from standard deviations and a correlation coefficient.
pub fn from_sigmas(sigma_x: f64, sigma_y: f64, rho: f64) -> Matrix2 {
    let cxy = rho * sigma_x * sigma_y;
    Matrix2::new(sigma_x * sigma_x, cxy, cxy, sigma_y * sigma_y)
}
