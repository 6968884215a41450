//! Capability shared by every positional transform.
//!
//! Each transform owns a working data set, maps positions in closed form,
//! supplies a per-point Jacobian consistent with that map and propagates
//! covariances as `J·C·Jᵀ`. The trait lets generic code (nudge checks,
//! chains of diagnostics) treat them uniformly.

use crate::chain::XyToEqu;
use crate::covariance;
use crate::gnomonic::Gnomonic;
use crate::points::{PointSet, Samples};
use crate::poly::{PolyTransform, Polynom};
use crate::units::Units;
use crate::Matrix2;

/// A positional transform with an analytic Jacobian.
pub trait Transform: Clone {
    /// Working input data.
    fn samples(&self) -> &Samples;

    /// Working data mapped through the transform.
    fn transformed(&self) -> &Samples;

    /// Jacobians at the working positions.
    fn jacobian(&self) -> &[Matrix2];

    /// Unit convention of the inputs.
    fn units(&self) -> Units;

    /// Map arbitrary input positions.
    fn evaluate_position(&self, points: &PointSet) -> PointSet;

    /// Jacobians at arbitrary input positions.
    fn jacobian_at(&self, points: &PointSet) -> Vec<Matrix2>;

    /// Replace the working data and recompute derived state.
    fn ingest_data(&mut self, points: PointSet, covariance: Vec<Matrix2>);

    /// Propagate covariances given at arbitrary input positions.
    fn propagate_covariance(&self, covariance: &[Matrix2], points: &PointSet) -> Vec<Matrix2> {
        covariance::propagate(&self.jacobian_at(points), covariance)
    }

    /// A new transform with the same parameters and covariances but the
    /// given working positions.
    fn with_points(&self, points: PointSet) -> Self {
        let mut snapshot = self.clone();
        let covariance = self.samples().covariance.clone();
        snapshot.ingest_data(points, covariance);
        snapshot
    }
}

macro_rules! impl_transform {
    ($ty:ty) => {
        impl Transform for $ty {
            fn samples(&self) -> &Samples {
                <$ty>::samples(self)
            }

            fn transformed(&self) -> &Samples {
                <$ty>::transformed(self)
            }

            fn jacobian(&self) -> &[Matrix2] {
                <$ty>::jacobian(self)
            }

            fn units(&self) -> Units {
                <$ty>::units(self)
            }

            fn evaluate_position(&self, points: &PointSet) -> PointSet {
                <$ty>::evaluate_position(self, points)
            }

            fn jacobian_at(&self, points: &PointSet) -> Vec<Matrix2> {
                <$ty>::jacobian_at(self, points)
            }

            fn ingest_data(&mut self, points: PointSet, covariance: Vec<Matrix2>) {
                <$ty>::ingest_data(self, points, covariance)
            }
        }
    };
}

impl_transform!(PolyTransform);
impl_transform!(Polynom);
impl_transform!(Gnomonic);
impl_transform!(XyToEqu);
