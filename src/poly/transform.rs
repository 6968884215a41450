//! Basis-family polynomial plane-to-plane transform.
//!
//! Maps `(x, y)` on one plane to `(x', y')` on another through a pair of 2D
//! series in one of the [`PolyKind`] families, evaluated at coordinates
//! rescaled onto `[-1, 1]`:
//!
//! ```text
//! x' = Σ A_ij B_i(xr) B_j(yr)
//! y' = Σ B_ij B_i(xr) B_j(yr)
//! ```
//!
//! The Jacobian is taken with respect to the *unrescaled* inputs, so the
//! basis derivatives are multiplied by the diagonal rescale factor:
//!
//! ```text
//! J = J_basis(xr, yr) · diag(2/(xmax−xmin), 2/(ymax−ymin))
//! ```

use nalgebra::DMatrix;
use tracing::{debug, warn};

use super::basis::{Axis, PolyKind};
use super::coeffs::{Degree, PolyCoeffs};
use super::domain::{Domain, DomainBounds};
use crate::covariance;
use crate::points::{PointSet, Samples};
use crate::units::Units;
use crate::Matrix2;

/// Configuration for a [`PolyTransform`].
#[derive(Debug, Clone)]
pub struct PolyConfig {
    /// Basis family of both output series.
    pub kind: PolyKind,
    /// Fixed domain bounds; unset bounds are taken from the first data set.
    pub bounds: DomainBounds,
    /// Pin the domain to `[-1, 1]` so inputs pass through unrescaled.
    pub no_rescale: bool,
    /// Units of the input plane (used to size arcsecond nudges).
    pub units: Units,
    /// Surface configuration warnings through `tracing`.
    pub verbose: bool,
}

impl Default for PolyConfig {
    fn default() -> Self {
        Self {
            kind: PolyKind::Polynomial,
            bounds: DomainBounds::default(),
            no_rescale: false,
            units: Units::Pixels,
            verbose: false,
        }
    }
}

/// Derivative coefficient grids of both output series.
#[derive(Debug, Clone)]
struct DerivativeGrids {
    /// `∂x'/∂xr`
    xx: DMatrix<f64>,
    /// `∂x'/∂yr`
    xy: DMatrix<f64>,
    /// `∂y'/∂xr`
    yx: DMatrix<f64>,
    /// `∂y'/∂yr`
    yy: DMatrix<f64>,
}

impl DerivativeGrids {
    fn empty() -> Self {
        Self {
            xx: DMatrix::zeros(0, 0),
            xy: DMatrix::zeros(0, 0),
            yx: DMatrix::zeros(0, 0),
            yy: DMatrix::zeros(0, 0),
        }
    }

    fn from_coeffs(kind: PolyKind, cx: &PolyCoeffs, cy: &PolyCoeffs) -> Self {
        Self {
            xx: kind.differentiate2d(cx.grid(), Axis::X),
            xy: kind.differentiate2d(cx.grid(), Axis::Y),
            yx: kind.differentiate2d(cy.grid(), Axis::X),
            yy: kind.differentiate2d(cy.grid(), Axis::Y),
        }
    }
}

/// Polynomial transform between two planes in a selectable basis family.
///
/// Holds a working data set (positions plus optional covariances) and the
/// state derived from it: rescaled positions, per-point Jacobians and the
/// transformed samples. Every mutator finishes with [`refresh`](Self::refresh).
#[derive(Debug, Clone)]
pub struct PolyTransform {
    kind: PolyKind,
    bounds: DomainBounds,
    no_rescale: bool,
    domain: Domain,
    coeffs_x: PolyCoeffs,
    coeffs_y: PolyCoeffs,
    derivs: DerivativeGrids,
    samples: Samples,
    rescaled: PointSet,
    jacobian: Vec<Matrix2>,
    transformed: Samples,
    units: Units,
    verbose: bool,
}

impl PolyTransform {
    /// Create a transform with no working data.
    ///
    /// Unset domain bounds resolve to `[-1, 1]`.
    pub fn new(config: &PolyConfig, coeffs_x: &[f64], coeffs_y: &[f64]) -> Self {
        Self::with_data(config, coeffs_x, coeffs_y, PointSet::default(), Vec::new())
    }

    /// Create a transform and ingest a working data set.
    ///
    /// Unset domain bounds are taken from this data and then stay fixed.
    pub fn with_data(
        config: &PolyConfig,
        coeffs_x: &[f64],
        coeffs_y: &[f64],
        points: PointSet,
        covariance: Vec<Matrix2>,
    ) -> Self {
        let samples = Samples::new(points, covariance, config.verbose);
        let domain = if config.no_rescale {
            Domain::unit()
        } else {
            Domain::resolve(&config.bounds, &samples.points)
        };
        let mut t = Self {
            kind: config.kind,
            bounds: config.bounds,
            no_rescale: config.no_rescale,
            domain,
            coeffs_x: PolyCoeffs::new(coeffs_x, config.verbose),
            coeffs_y: PolyCoeffs::new(coeffs_y, config.verbose),
            derivs: DerivativeGrids::empty(),
            samples,
            rescaled: PointSet::default(),
            jacobian: Vec::new(),
            transformed: Samples::default(),
            units: config.units,
            verbose: config.verbose,
        };
        t.refresh();
        t
    }

    /// Replace the working data set.
    ///
    /// The domain is *not* re-derived: a fitted transform keeps its meaning
    /// for new data. Use [`update_limits`](Self::update_limits) to change it.
    pub fn ingest_data(&mut self, points: PointSet, covariance: Vec<Matrix2>) {
        self.samples = Samples::new(points, covariance, self.verbose);
        self.refresh();
    }

    /// Change the domain bounds; unset bounds resolve against the current data.
    pub fn update_limits(&mut self, bounds: DomainBounds) {
        self.bounds = bounds;
        self.domain = if self.no_rescale {
            Domain::unit()
        } else {
            Domain::resolve(&bounds, &self.samples.points)
        };
        self.refresh();
    }

    /// Replace the coefficients from a flat `[x-coeffs, y-coeffs]` vector.
    ///
    /// The vector is split into equal halves. An empty vector is a no-op;
    /// an odd length is rejected (with a warning when verbose).
    pub fn update_transform(&mut self, pars: &[f64]) {
        if pars.is_empty() {
            return;
        }
        if pars.len() % 2 != 0 {
            if self.verbose {
                warn!(
                    "Parameter vector of length {} cannot be split into x/y halves",
                    pars.len()
                );
            }
            return;
        }
        let (px, py) = pars.split_at(pars.len() / 2);
        self.coeffs_x.update(px);
        self.coeffs_y.update(py);
        self.refresh();
    }

    /// Recompute all derived state from the current domain, coefficients
    /// and working data.
    pub fn refresh(&mut self) {
        if self.no_rescale {
            self.domain = Domain::unit();
        }
        self.rescaled = self.domain.rescale_points(&self.samples.points);
        self.derivs = if self.is_valid() {
            DerivativeGrids::from_coeffs(self.kind, &self.coeffs_x, &self.coeffs_y)
        } else {
            DerivativeGrids::empty()
        };
        self.jacobian = self.jacobian_rescaled(&self.rescaled);
        let points = self.evaluate_rescaled(&self.rescaled);
        let covariance = covariance::propagate(&self.jacobian, &self.samples.covariance);
        self.transformed = Samples {
            points,
            covariance,
        };
        debug!(
            "{} transform refreshed: degree {:?}, {} points, {} covariances",
            self.kind,
            self.coeffs_x.degree(),
            self.samples.len(),
            self.transformed.covariance.len()
        );
    }

    /// Map raw positions through the transform.
    ///
    /// Returns an empty set when the coefficients are invalid.
    pub fn evaluate_position(&self, points: &PointSet) -> PointSet {
        self.evaluate_rescaled(&self.domain.rescale_points(points))
    }

    /// Per-point Jacobian `∂(x', y')/∂(x, y)` at raw positions.
    pub fn jacobian_at(&self, points: &PointSet) -> Vec<Matrix2> {
        self.jacobian_rescaled(&self.domain.rescale_points(points))
    }

    /// Propagate covariances given at raw positions: `J·C·Jᵀ`.
    pub fn propagate_covariance(&self, covariance: &[Matrix2], points: &PointSet) -> Vec<Matrix2> {
        covariance::propagate(&self.jacobian_at(points), covariance)
    }

    fn evaluate_rescaled(&self, rescaled: &PointSet) -> PointSet {
        if !self.is_valid() {
            return PointSet::default();
        }
        let gx = self.coeffs_x.grid();
        let gy = self.coeffs_y.grid();
        PointSet::new(
            rescaled
                .iter()
                .map(|&(xr, yr)| (self.kind.eval2d(xr, yr, gx), self.kind.eval2d(xr, yr, gy)))
                .collect(),
        )
    }

    fn jacobian_rescaled(&self, rescaled: &PointSet) -> Vec<Matrix2> {
        if !self.is_valid() {
            return Vec::new();
        }
        let scale = self.domain.jacobian();
        let d = &self.derivs;
        rescaled
            .iter()
            .map(|&(xr, yr)| {
                let basis = Matrix2::new(
                    self.kind.eval2d(xr, yr, &d.xx),
                    self.kind.eval2d(xr, yr, &d.xy),
                    self.kind.eval2d(xr, yr, &d.yx),
                    self.kind.eval2d(xr, yr, &d.yy),
                );
                basis * scale
            })
            .collect()
    }

    /// `true` when both coefficient sets have a valid degree.
    pub fn is_valid(&self) -> bool {
        self.coeffs_x.is_valid() && self.coeffs_y.is_valid()
    }

    pub fn kind(&self) -> PolyKind {
        self.kind
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn bounds(&self) -> DomainBounds {
        self.bounds
    }

    pub fn degree(&self) -> Degree {
        self.coeffs_x.degree()
    }

    pub fn coeffs_x(&self) -> &PolyCoeffs {
        &self.coeffs_x
    }

    pub fn coeffs_y(&self) -> &PolyCoeffs {
        &self.coeffs_y
    }

    /// Flat `[x-coeffs, y-coeffs]` parameter vector.
    pub fn parameters(&self) -> Vec<f64> {
        let mut p = self.coeffs_x.flat().to_vec();
        p.extend_from_slice(self.coeffs_y.flat());
        p
    }

    /// Working data set.
    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    /// Working positions rescaled onto the domain.
    pub fn rescaled(&self) -> &PointSet {
        &self.rescaled
    }

    /// Jacobians at the working positions.
    pub fn jacobian(&self) -> &[Matrix2] {
        &self.jacobian
    }

    /// Working data mapped through the transform.
    pub fn transformed(&self) -> &Samples {
        &self.transformed
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Parameter labels: x-series then y-series.
    pub fn labels(&self, prefix_x: &str, prefix_y: &str) -> Vec<String> {
        let mut labels = self.coeffs_x.labels(prefix_x);
        labels.extend(self.coeffs_y.labels(prefix_y));
        labels
    }

    /// Indices of the affine terms `(a, b, c, d, e, f)` in the flat
    /// parameter vector, for `x' = a + b·x + c·y`, `y' = d + e·x + f·y`.
    ///
    /// `None` below degree 1.
    pub fn affine_indices(&self) -> Option<[usize; 6]> {
        match self.coeffs_x.degree() {
            Degree::Valid(d) if d >= 1 => {
                let m = self.coeffs_x.flat().len();
                Some([0, 1, 2, m, m + 1, m + 2])
            }
            _ => None,
        }
    }
}
