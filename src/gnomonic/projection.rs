//! Closed-form gnomonic projection and its Jacobians.
//!
//! All angles are in radians. `(α0, δ0)` is the tangent point.

use crate::Matrix2;

// ── Position maps ──────────────────────────────────────────────────────────

/// Forward gnomonic projection: equatorial `(α, δ)` → tangent plane `(ξ, η)`.
///
/// ```text
/// D = cos(α−α0) cos δ cos δ0 + sin δ sin δ0
/// ξ = cos δ sin(α−α0) / D
/// η = (cos δ0 sin δ − cos(α−α0) cos δ sin δ0) / D
/// ```
///
/// Returns `None` if the point is on or behind the tangent plane.
#[inline]
pub fn tan_project(alpha: f64, delta: f64, alpha0: f64, delta0: f64) -> Option<(f64, f64)> {
    let da = alpha - alpha0;
    let (sin_d, cos_d) = delta.sin_cos();
    let (sin_d0, cos_d0) = delta0.sin_cos();
    let (sin_da, cos_da) = da.sin_cos();

    let denom = cos_da * cos_d * cos_d0 + sin_d * sin_d0;
    if denom <= 1e-12 {
        return None;
    }
    let xi = cos_d * sin_da / denom;
    let eta = (cos_d0 * sin_d - cos_da * cos_d * sin_d0) / denom;
    Some((xi, eta))
}

/// Inverse gnomonic projection: tangent plane `(ξ, η)` → equatorial `(α, δ)`.
///
/// ```text
/// γ = cos δ0 − η sin δ0
/// α = α0 + atan(ξ/γ)
/// δ = atan((η cos δ0 + sin δ0) / √(ξ² + γ²))
/// ```
///
/// Valid for points less than 90° from the tangent point (`γ > 0`).
#[inline]
pub fn inverse_tan_project(xi: f64, eta: f64, alpha0: f64, delta0: f64) -> (f64, f64) {
    let (sin_d0, cos_d0) = delta0.sin_cos();
    let gamma = cos_d0 - eta * sin_d0;
    let alpha = alpha0 + (xi / gamma).atan();
    let delta = ((eta * cos_d0 + sin_d0) / (xi * xi + gamma * gamma).sqrt()).atan();
    (alpha, delta)
}

// ── Jacobians ──────────────────────────────────────────────────────────────

/// `∂(α, δ)/∂(ξ, η)` of [`inverse_tan_project`].
///
/// Independent of `α0`.
#[inline]
pub fn inverse_tan_jacobian(xi: f64, eta: f64, delta0: f64) -> Matrix2 {
    let (sin_d0, cos_d0) = delta0.sin_cos();
    let gamma = cos_d0 - eta * sin_d0;
    let q = xi * xi + gamma * gamma;
    let denom = (1.0 + xi * xi + eta * eta) * q.sqrt();

    let da_dxi = gamma / q;
    let da_deta = xi * sin_d0 / q;
    let dd_dxi = -xi * (eta * cos_d0 + sin_d0) / denom;
    let dd_deta = ((1.0 + xi * xi) * cos_d0 - eta * sin_d0) / denom;
    Matrix2::new(da_dxi, da_deta, dd_dxi, dd_deta)
}

/// `∂(ξ, η)/∂(α, δ)` of [`tan_project`].
///
/// Returns `None` where the projection itself is undefined.
#[inline]
pub fn tan_jacobian(alpha: f64, delta: f64, alpha0: f64, delta0: f64) -> Option<Matrix2> {
    let da = alpha - alpha0;
    let (sin_d, cos_d) = delta.sin_cos();
    let (sin_d0, cos_d0) = delta0.sin_cos();
    let (sin_da, cos_da) = da.sin_cos();

    let denom = cos_da * cos_d * cos_d0 + sin_d * sin_d0;
    if denom <= 1e-12 {
        return None;
    }
    let d2 = denom * denom;

    let dxi_da = cos_d * (cos_d * cos_d0 + cos_da * sin_d * sin_d0) / d2;
    let dxi_dd = -sin_da * sin_d0 / d2;
    let deta_da = 0.5 * sin_da * (2.0 * delta).sin() / d2;
    let deta_dd = cos_da / d2;
    Some(Matrix2::new(dxi_da, dxi_dd, deta_da, deta_dd))
}

#[cfg(test)]
mod tests {
    use super::*;

    const A0: f64 = 0.61;
    const D0: f64 = 0.61;

    fn points() -> Vec<(f64, f64)> {
        vec![
            (0.0, 0.0),
            (0.02, -0.01),
            (-0.035, 0.03),
            (0.1, 0.2),
            (-0.25, -0.15),
        ]
    }

    #[test]
    fn test_round_trip() {
        for (xi, eta) in points() {
            let (a, d) = inverse_tan_project(xi, eta, A0, D0);
            let (xi2, eta2) = tan_project(a, d, A0, D0).unwrap();
            assert!(
                (xi - xi2).abs() < 1e-13 && (eta - eta2).abs() < 1e-13,
                "({}, {}) -> ({}, {})",
                xi,
                eta,
                xi2,
                eta2
            );
        }
    }

    #[test]
    fn test_tangent_point_maps_to_origin() {
        let (xi, eta) = tan_project(A0, D0, A0, D0).unwrap();
        assert!(xi.abs() < 1e-15 && eta.abs() < 1e-15);
        let (a, d) = inverse_tan_project(0.0, 0.0, A0, D0);
        assert!((a - A0).abs() < 1e-15 && (d - D0).abs() < 1e-15);
    }

    #[test]
    fn test_behind_plane() {
        assert!(tan_project(std::f64::consts::PI, 0.0, 0.0, 0.0).is_none());
        assert!(tan_jacobian(std::f64::consts::PI, 0.0, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_jacobians_are_inverse() {
        for (xi, eta) in points() {
            let (a, d) = inverse_tan_project(xi, eta, A0, D0);
            let ji = inverse_tan_jacobian(xi, eta, D0);
            let jf = tan_jacobian(a, d, A0, D0).unwrap();
            let prod = jf * ji;
            assert!(
                (prod - Matrix2::identity()).norm() < 1e-12,
                "J_f·J_i = {} at ({}, {})",
                prod,
                xi,
                eta
            );
        }
    }

    #[test]
    fn test_inverse_jacobian_finite_difference() {
        let h = 1e-7;
        for (xi, eta) in points() {
            let j = inverse_tan_jacobian(xi, eta, D0);
            let (ap, dp) = inverse_tan_project(xi + h, eta, A0, D0);
            let (am, dm) = inverse_tan_project(xi - h, eta, A0, D0);
            let (aq, dq) = inverse_tan_project(xi, eta + h, A0, D0);
            let (an, dn) = inverse_tan_project(xi, eta - h, A0, D0);
            let fd = Matrix2::new(
                (ap - am) / (2.0 * h),
                (aq - an) / (2.0 * h),
                (dp - dm) / (2.0 * h),
                (dq - dn) / (2.0 * h),
            );
            assert!((j - fd).norm() < 1e-7, "{} vs {}", j, fd);
        }
    }

    #[test]
    fn test_forward_jacobian_finite_difference() {
        let h = 1e-7;
        for (xi, eta) in points() {
            let (a, d) = inverse_tan_project(xi, eta, A0, D0);
            let j = tan_jacobian(a, d, A0, D0).unwrap();
            let f = |a: f64, d: f64| tan_project(a, d, A0, D0).unwrap();
            let (xp, ep) = f(a + h, d);
            let (xm, em) = f(a - h, d);
            let (xq, eq) = f(a, d + h);
            let (xn, en) = f(a, d - h);
            let fd = Matrix2::new(
                (xp - xm) / (2.0 * h),
                (xq - xn) / (2.0 * h),
                (ep - em) / (2.0 * h),
                (eq - en) / (2.0 * h),
            );
            assert!((j - fd).norm() < 1e-7, "{} vs {}", j, fd);
        }
    }
}
