use tracing::{debug, warn};

use super::ChainConfig;
use crate::covariance;
use crate::gnomonic::{Direction, Gnomonic};
use crate::params::{ParamError, ParameterVector};
use crate::points::{PointSet, Samples};
use crate::poly::{DomainBounds, PolyTransform};
use crate::units::Units;
use crate::Matrix2;

/// Detector plane → sky through a polynomial and an inverse gnomonic
/// projection.
///
/// ```text
/// (x, y) --poly--> (ξ, η) --tan→equ--> (α, δ)
/// J_total = J_gnomonic(ξ, η) · J_poly(x, y)
/// ```
///
/// The gnomonic Jacobian depends on position, so every change upstream
/// re-derives `(ξ, η)` before the sky stage is refreshed.
#[derive(Debug, Clone)]
pub struct XyToEqu {
    params: ParameterVector,
    poly: PolyTransform,
    tan: Gnomonic,
    jacobian: Vec<Matrix2>,
    verbose: bool,
}

impl XyToEqu {
    /// Create a chain with no working data.
    pub fn new(config: &ChainConfig, pars: &[f64]) -> Result<Self, ParamError> {
        Self::with_data(config, pars, PointSet::default(), Vec::new())
    }

    /// Create a chain and push a detector-plane data set through it.
    pub fn with_data(
        config: &ChainConfig,
        pars: &[f64],
        points: PointSet,
        covariance: Vec<Matrix2>,
    ) -> Result<Self, ParamError> {
        let params = ParameterVector::ingest(pars)?;
        let poly = PolyTransform::with_data(
            &config.poly_config(),
            &params.coeffs_x,
            &params.coeffs_y,
            points,
            covariance,
        );
        let tan = Gnomonic::new(
            Direction::TanToEqu,
            &config.gnomonic_config(),
            params.tangent_point,
        );
        let mut chain = Self {
            params,
            poly,
            tan,
            jacobian: Vec::new(),
            verbose: config.verbose,
        };
        chain.refresh();
        Ok(chain)
    }

    /// Replace the detector-plane data set.
    pub fn ingest_data(&mut self, points: PointSet, covariance: Vec<Matrix2>) {
        self.poly.ingest_data(points, covariance);
        self.refresh();
    }

    /// Change the polynomial domain bounds.
    pub fn update_limits(&mut self, bounds: DomainBounds) {
        self.poly.update_limits(bounds);
        self.refresh();
    }

    /// Replace all parameters from a flat `[α0, δ0, x-coeffs, y-coeffs]`
    /// vector.
    ///
    /// An empty vector is a no-op. An invalid vector leaves the chain
    /// unchanged and is reported back (and logged when verbose).
    pub fn update_transform(&mut self, pars: &[f64]) -> Result<(), ParamError> {
        if pars.is_empty() {
            return Ok(());
        }
        let params = match ParameterVector::ingest(pars) {
            Ok(p) => p,
            Err(e) => {
                if self.verbose {
                    warn!("XyToEqu: {}; parameters unchanged", e);
                }
                return Err(e);
            }
        };
        self.poly.update_transform(&params.poly_parameters());
        self.tan.set_tangent_point(params.tangent_point);
        self.params.absorb(params);
        self.refresh();
        Ok(())
    }

    /// Re-derive tangent-plane positions, then the sky stage and the total
    /// Jacobian.
    pub fn refresh(&mut self) {
        let tp = self.poly.transformed();
        self.tan.ingest_data(tp.points.clone(), tp.covariance.clone());
        self.jacobian = covariance::compose(self.tan.jacobian(), self.poly.jacobian());
        debug!(
            "XyToEqu refreshed: {} points, {} sky covariances",
            self.poly.samples().len(),
            self.tan.transformed().covariance.len()
        );
    }

    /// Map detector-plane positions to the sky.
    pub fn evaluate_position(&self, points: &PointSet) -> PointSet {
        self.tan.evaluate_position(&self.poly.evaluate_position(points))
    }

    /// Total Jacobian `∂(α, δ)/∂(x, y)` at detector-plane positions.
    pub fn jacobian_at(&self, points: &PointSet) -> Vec<Matrix2> {
        let tangent = self.poly.evaluate_position(points);
        covariance::compose(&self.tan.jacobian_at(&tangent), &self.poly.jacobian_at(points))
    }

    /// Propagate detector-plane covariances to the sky.
    pub fn propagate_covariance(&self, covariance: &[Matrix2], points: &PointSet) -> Vec<Matrix2> {
        covariance::propagate(&self.jacobian_at(points), covariance)
    }

    pub fn params(&self) -> &ParameterVector {
        &self.params
    }

    /// Detector → tangent plane stage.
    pub fn poly(&self) -> &PolyTransform {
        &self.poly
    }

    /// Tangent plane → sky stage.
    pub fn tan(&self) -> &Gnomonic {
        &self.tan
    }

    /// Detector-plane working data.
    pub fn samples(&self) -> &Samples {
        self.poly.samples()
    }

    /// Working data on the tangent plane.
    pub fn intermediate(&self) -> &Samples {
        self.poly.transformed()
    }

    /// Working data on the sky.
    pub fn transformed(&self) -> &Samples {
        self.tan.transformed()
    }

    /// Unit convention of the detector-plane inputs.
    pub fn units(&self) -> Units {
        self.poly.units()
    }

    /// Total Jacobians at the working positions.
    pub fn jacobian(&self) -> &[Matrix2] {
        &self.jacobian
    }

    /// Labels of the external parameter vector.
    pub fn labels(&self) -> Vec<String> {
        self.params.labels("A", "B")
    }

    /// Affine-term indices in the external parameter vector.
    pub fn affine_indices(&self) -> Option<[usize; 6]> {
        self.params.affine_indices()
    }
}
