//! Jacobian-predicted versus brute-force position deltas.
//!
//! A transform's working positions are nudged by a fixed offset given in
//! arcseconds (one pixel per "arcsecond" on a detector plane). The output
//! displacement predicted by the Jacobian, `Δ_J = J·δ`, is compared with the
//! brute-force difference between the nudged and unnudged outputs, `Δ`.
//! The fractional discrepancy `(Δ − Δ_J)/|Δ|` shrinks with the nudge for
//! a correct Jacobian.

use tracing::debug;

use crate::covariance;
use crate::transform::Transform;
use crate::Matrix2;

/// Outcome of [`check_deltas`], one entry per working point.
#[derive(Debug, Clone, Default)]
pub struct DeltaCheck {
    /// `Δ_J = J·δ`.
    pub jacobian: Vec<(f64, f64)>,
    /// `Δ`, from evaluating the nudged positions.
    pub brute: Vec<(f64, f64)>,
    /// `(Δx − Δx_J) / |Δ|`.
    pub frac_x: Vec<f64>,
    /// `(Δy − Δy_J) / |Δ|`.
    pub frac_y: Vec<f64>,
    /// `det J` at the unnudged positions.
    pub det: Vec<f64>,
}

impl DeltaCheck {
    /// Largest absolute fractional discrepancy over both axes.
    pub fn max_frac(&self) -> f64 {
        self.frac_x
            .iter()
            .chain(&self.frac_y)
            .map(|f| f.abs())
            .fold(0.0, f64::max)
    }

    /// Number of points checked.
    pub fn len(&self) -> usize {
        self.brute.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brute.is_empty()
    }
}

/// The nudge `(dx″, dy″)` expressed in the transform's input units.
pub fn nudge_offset<T: Transform>(transform: &T, dx_arcsec: f64, dy_arcsec: f64) -> (f64, f64) {
    let arcsec = transform.units().arcsec();
    (dx_arcsec * arcsec, dy_arcsec * arcsec)
}

/// A snapshot of `transform` with every working position offset by
/// `(dx″, dy″)`.
pub fn nudged<T: Transform>(transform: &T, dx_arcsec: f64, dy_arcsec: f64) -> T {
    let (dx, dy) = nudge_offset(transform, dx_arcsec, dy_arcsec);
    transform.with_points(transform.samples().points.offset(dx, dy))
}

/// Output displacement predicted by the working Jacobians for the nudge.
pub fn jacobian_deltas<T: Transform>(
    transform: &T,
    dx_arcsec: f64,
    dy_arcsec: f64,
) -> Vec<(f64, f64)> {
    let (dx, dy) = nudge_offset(transform, dx_arcsec, dy_arcsec);
    covariance::apply(transform.jacobian(), dx, dy)
}

/// Compare Jacobian-predicted and brute-force deltas for a nudge.
///
/// Returns an empty check if the transform has no working outputs or the
/// nudge is zero.
pub fn check_deltas<T: Transform>(transform: &T, dx_arcsec: f64, dy_arcsec: f64) -> DeltaCheck {
    if dx_arcsec == 0.0 && dy_arcsec == 0.0 {
        return DeltaCheck::default();
    }
    let predicted = jacobian_deltas(transform, dx_arcsec, dy_arcsec);
    let moved = nudged(transform, dx_arcsec, dy_arcsec);
    let before = &transform.transformed().points;
    let after = &moved.transformed().points;
    if predicted.is_empty() || before.len() != predicted.len() || after.len() != before.len() {
        return DeltaCheck::default();
    }

    let brute: Vec<(f64, f64)> = after
        .iter()
        .zip(before.iter())
        .map(|(a, b)| (a.0 - b.0, a.1 - b.1))
        .collect();
    let (frac_x, frac_y): (Vec<f64>, Vec<f64>) = brute
        .iter()
        .zip(&predicted)
        .map(|(&(bx, by), &(jx, jy))| {
            let mag = bx.hypot(by);
            ((bx - jx) / mag, (by - jy) / mag)
        })
        .unzip();
    let det = covariance::determinants(transform.jacobian());

    let check = DeltaCheck {
        jacobian: predicted,
        brute,
        frac_x,
        frac_y,
        det,
    };
    debug!(
        "Delta check ({}\", {}\"): {} points, max fractional discrepancy {:.3e}",
        dx_arcsec,
        dy_arcsec,
        check.len(),
        check.max_frac()
    );
    check
}

/// Jacobians of a nudged snapshot, for comparing how fast they vary.
pub fn nudged_jacobian<T: Transform>(transform: &T, dx_arcsec: f64, dy_arcsec: f64) -> Vec<Matrix2> {
    nudged(transform, dx_arcsec, dy_arcsec).jacobian().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gnomonic::{Direction, Gnomonic, GnomonicConfig};
    use crate::points::PointSet;
    use crate::poly::{PolyConfig, PolyTransform};
    use crate::units::Units;

    #[test]
    fn test_linear_transform_is_exact() {
        let t = PolyTransform::with_data(
            &PolyConfig {
                no_rescale: true,
                ..Default::default()
            },
            &[1.0, 2.0, 0.5],
            &[-1.0, 0.3, 4.0],
            PointSet::new(vec![(0.0, 0.0), (10.0, -3.0), (7.0, 7.0)]),
            Vec::new(),
        );
        let check = check_deltas(&t, 1.0, 2.0);
        assert_eq!(check.len(), 3);
        assert!(check.max_frac() < 1e-12);
        for d in &check.det {
            assert!((d - (2.0 * 4.0 - 0.5 * 0.3)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_nudge_units() {
        let t = Gnomonic::tan_to_equ(&GnomonicConfig::default(), [0.0, 0.0]);
        let (dx, dy) = nudge_offset(&t, 3600.0, 0.0);
        assert!((dx - 1.0).abs() < 1e-15 && dy == 0.0);
        let r = Gnomonic::tan_to_equ(
            &GnomonicConfig {
                units: Units::Radians,
                ..Default::default()
            },
            [0.0, 0.0],
        );
        let (dx, _) = nudge_offset(&r, 1.0, 0.0);
        assert!((dx - (1.0_f64 / 3600.0).to_radians()).abs() < 1e-20);
    }

    #[test]
    fn test_nudged_snapshot_leaves_original() {
        let pts = PointSet::new(vec![(0.5, 0.5)]);
        let t = Gnomonic::with_data(
            Direction::TanToEqu,
            &GnomonicConfig::default(),
            [35.0, 35.0],
            pts.clone(),
            Vec::new(),
        );
        let n = nudged(&t, 36.0, -36.0);
        assert_eq!(t.samples().points, pts);
        let (x, y) = n.samples().points.coords[0];
        assert!((x - 0.51).abs() < 1e-12 && (y - 0.49).abs() < 1e-12);
        assert_eq!(nudged_jacobian(&t, 36.0, -36.0), n.jacobian().to_vec());
    }

    #[test]
    fn test_empty_transform_gives_empty_check() {
        let t = Gnomonic::tan_to_equ(&GnomonicConfig::default(), [35.0, 35.0]);
        assert!(check_deltas(&t, 10.0, 10.0).is_empty());
    }

    #[test]
    fn test_zero_nudge_gives_empty_check() {
        let t = Gnomonic::with_data(
            Direction::TanToEqu,
            &GnomonicConfig::default(),
            [35.0, 35.0],
            PointSet::new(vec![(0.1, 0.2), (-0.3, 0.4)]),
            Vec::new(),
        );
        let check = check_deltas(&t, 0.0, 0.0);
        assert!(check.is_empty());
        assert_eq!(check.max_frac(), 0.0);
        // one zero component is still a valid nudge
        let check = check_deltas(&t, 0.0, 5.0);
        assert_eq!(check.len(), 2);
        assert!(check.frac_x.iter().chain(&check.frac_y).all(|f| f.is_finite()));
    }
}
