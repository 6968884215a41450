use tracing::{debug, warn};

use super::ChainConfig;
use crate::gnomonic::{Direction, Gnomonic};
use crate::params::{ParamError, ParameterVector};
use crate::points::{PointSet, Samples};
use crate::poly::{DomainBounds, PolyTransform};
use crate::Matrix2;

/// Detector positions and catalog sky positions, both projected onto the
/// tangent plane.
///
/// The polynomial (detector → tangent plane) and the forward gnomonic
/// projection (sky → tangent plane) run side by side on independent data;
/// they share only the tangent point of the parameter vector.
#[derive(Debug, Clone)]
pub struct TangentPlane {
    params: ParameterVector,
    poly: PolyTransform,
    sky: Gnomonic,
    verbose: bool,
}

impl TangentPlane {
    /// Create from detector-plane data and matching sky targets.
    pub fn with_data(
        config: &ChainConfig,
        pars: &[f64],
        xy: PointSet,
        cov_xy: Vec<Matrix2>,
        radec: PointSet,
        cov_radec: Vec<Matrix2>,
    ) -> Result<Self, ParamError> {
        let params = ParameterVector::ingest(pars)?;
        let poly = PolyTransform::with_data(
            &config.poly_config(),
            &params.coeffs_x,
            &params.coeffs_y,
            xy,
            cov_xy,
        );
        let sky = Gnomonic::with_data(
            Direction::EquToTan,
            &config.gnomonic_config(),
            params.tangent_point,
            radec,
            cov_radec,
        );
        if config.verbose && poly.samples().len() != sky.samples().len() {
            warn!(
                "TangentPlane: {} detector points but {} sky targets",
                poly.samples().len(),
                sky.samples().len()
            );
        }
        Ok(Self {
            params,
            poly,
            sky,
            verbose: config.verbose,
        })
    }

    /// Replace the detector-plane data set.
    pub fn ingest_data(&mut self, xy: PointSet, cov_xy: Vec<Matrix2>) {
        self.poly.ingest_data(xy, cov_xy);
    }

    /// Replace the sky targets.
    pub fn ingest_targets(&mut self, radec: PointSet, cov_radec: Vec<Matrix2>) {
        self.sky.ingest_data(radec, cov_radec);
    }

    /// Change the polynomial domain bounds.
    pub fn update_limits(&mut self, bounds: DomainBounds) {
        self.poly.update_limits(bounds);
    }

    /// Replace all parameters; the tangent point goes to the sky stage and
    /// the coefficients to the polynomial.
    ///
    /// An empty vector is a no-op; an invalid one leaves both stages
    /// unchanged.
    pub fn update_transform(&mut self, pars: &[f64]) -> Result<(), ParamError> {
        if pars.is_empty() {
            return Ok(());
        }
        let params = ParameterVector::ingest(pars).inspect_err(|e| {
            if self.verbose {
                warn!("TangentPlane: {}; parameters unchanged", e);
            }
        })?;
        self.poly.update_transform(&params.poly_parameters());
        self.sky.set_tangent_point(params.tangent_point);
        self.params.absorb(params);
        debug!(
            "TangentPlane updated: tangent point ({}, {})",
            self.params.tangent_point[0], self.params.tangent_point[1]
        );
        Ok(())
    }

    /// Detector data on the tangent plane.
    pub fn projected(&self) -> &Samples {
        self.poly.transformed()
    }

    /// Sky targets on the tangent plane.
    pub fn targets(&self) -> &Samples {
        self.sky.transformed()
    }

    /// Per-point `projected − target` on the tangent plane.
    ///
    /// Empty unless both sides hold the same number of points.
    pub fn residuals(&self) -> Vec<(f64, f64)> {
        let p = &self.projected().points;
        let t = &self.targets().points;
        if p.len() != t.len() {
            return Vec::new();
        }
        p.iter()
            .zip(t.iter())
            .map(|(a, b)| (a.0 - b.0, a.1 - b.1))
            .collect()
    }

    /// Per-point summed covariance of the residuals.
    ///
    /// Empty unless both sides carry a full covariance field.
    pub fn residual_covariance(&self) -> Vec<Matrix2> {
        let cp = &self.projected().covariance;
        let ct = &self.targets().covariance;
        if cp.is_empty() || cp.len() != ct.len() {
            return Vec::new();
        }
        cp.iter().zip(ct).map(|(a, b)| a + b).collect()
    }

    pub fn params(&self) -> &ParameterVector {
        &self.params
    }

    /// Detector → tangent plane stage.
    pub fn poly(&self) -> &PolyTransform {
        &self.poly
    }

    /// Sky → tangent plane stage.
    pub fn sky(&self) -> &Gnomonic {
        &self.sky
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
