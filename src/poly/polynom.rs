//! Hand-expanded power-series transform, up to fifth order.
//!
//! Evaluates the monomial sums directly on the *raw* input coordinates: no
//! domain rescaling and no family choice. Coefficients follow the same
//! flat order as the rest of the crate (`1, x, y, x², xy, y², x³, ...`).
//!
//! The number of terms used is set by the coefficient count:
//!
//! | count  | terms used         |
//! |--------|--------------------|
//! | < 3    | constant           |
//! | < 6    | through linear     |
//! | < 10   | through quadratic  |
//! | < 15   | through cubic      |
//! | < 21   | through quartic    |
//! | ≥ 21   | through quintic    |
//!
//! Coefficients beyond the last complete order are ignored (with a warning
//! when verbose). Results agree
//! with [`PolyTransform`](super::PolyTransform) only when the latter runs
//! with `no_rescale` (or a unit domain) and the power basis.

use tracing::{debug, warn};

use crate::covariance;
use crate::points::{PointSet, Samples};
use crate::units::Units;
use crate::Matrix2;

/// Evaluate `z(x, y)` from flat power-series coefficients.
pub fn polyval2d(p: &[f64], x: f64, y: f64) -> f64 {
    let n = p.len();
    if n == 0 {
        return 0.0;
    }
    let mut z = p[0];
    if n < 3 {
        return z;
    }
    z += x * p[1] + y * p[2];
    if n < 6 {
        return z;
    }
    let (x2, y2) = (x * x, y * y);
    z += x2 * p[3] + x * y * p[4] + y2 * p[5];
    if n < 10 {
        return z;
    }
    let (x3, y3) = (x2 * x, y2 * y);
    z += x3 * p[6] + x2 * y * p[7] + x * y2 * p[8] + y3 * p[9];
    if n < 15 {
        return z;
    }
    let (x4, y4) = (x3 * x, y3 * y);
    z += x4 * p[10] + x3 * y * p[11] + x2 * y2 * p[12] + x * y3 * p[13] + y4 * p[14];
    if n < 21 {
        return z;
    }
    z += x4 * x * p[15]
        + x4 * y * p[16]
        + x3 * y2 * p[17]
        + x2 * y3 * p[18]
        + x * y4 * p[19]
        + y4 * y * p[20];
    z
}

/// Partial derivatives `(∂z/∂x, ∂z/∂y)` of [`polyval2d`].
pub fn gradient2d(p: &[f64], x: f64, y: f64) -> (f64, f64) {
    let n = p.len();
    if n < 3 {
        return (0.0, 0.0);
    }
    let mut zx = p[1];
    let mut zy = p[2];
    if n < 6 {
        return (zx, zy);
    }
    zx += 2.0 * x * p[3] + y * p[4];
    zy += x * p[4] + 2.0 * y * p[5];
    if n < 10 {
        return (zx, zy);
    }
    let (x2, y2, xy) = (x * x, y * y, x * y);
    zx += 3.0 * x2 * p[6] + 2.0 * xy * p[7] + y2 * p[8];
    zy += x2 * p[7] + 2.0 * xy * p[8] + 3.0 * y2 * p[9];
    if n < 15 {
        return (zx, zy);
    }
    let (x3, y3) = (x2 * x, y2 * y);
    zx += 4.0 * x3 * p[10] + 3.0 * x2 * y * p[11] + 2.0 * x * y2 * p[12] + y3 * p[13];
    zy += x3 * p[11] + 2.0 * x2 * y * p[12] + 3.0 * x * y2 * p[13] + 4.0 * y3 * p[14];
    if n < 21 {
        return (zx, zy);
    }
    zx += 5.0 * x3 * x * p[15]
        + 4.0 * x3 * y * p[16]
        + 3.0 * x2 * y2 * p[17]
        + 2.0 * x * y3 * p[18]
        + y3 * y * p[19];
    zy += x3 * x * p[16]
        + 2.0 * x3 * y * p[17]
        + 3.0 * x2 * y2 * p[18]
        + 4.0 * x * y3 * p[19]
        + 5.0 * y3 * y * p[20];
    (zx, zy)
}

/// Number of leading coefficients [`polyval2d`] uses out of `n`.
pub fn terms_used(n: usize) -> usize {
    match n {
        0 => 0,
        1..=2 => 1,
        3..=5 => 3,
        6..=9 => 6,
        10..=14 => 10,
        15..=20 => 15,
        _ => 21,
    }
}

/// Configuration for a [`Polynom`].
#[derive(Debug, Clone)]
pub struct PolynomConfig {
    /// Units of the input plane (used to size arcsecond nudges).
    pub units: Units,
    /// Surface ignored coefficients and data mismatches through `tracing`.
    pub verbose: bool,
}

impl Default for PolynomConfig {
    fn default() -> Self {
        Self {
            units: Units::Pixels,
            verbose: false,
        }
    }
}

/// Power-series plane-to-plane transform on raw coordinates.
#[derive(Debug, Clone)]
pub struct Polynom {
    pars_x: Vec<f64>,
    pars_y: Vec<f64>,
    samples: Samples,
    jacobian: Vec<Matrix2>,
    transformed: Samples,
    units: Units,
    verbose: bool,
}

impl Polynom {
    /// Create a transform with no working data.
    pub fn new(config: &PolynomConfig, pars_x: &[f64], pars_y: &[f64]) -> Self {
        Self::with_data(config, pars_x, pars_y, PointSet::default(), Vec::new())
    }

    /// Create a transform and ingest a working data set.
    pub fn with_data(
        config: &PolynomConfig,
        pars_x: &[f64],
        pars_y: &[f64],
        points: PointSet,
        covariance: Vec<Matrix2>,
    ) -> Self {
        let mut t = Self {
            pars_x: Vec::new(),
            pars_y: Vec::new(),
            samples: Samples::new(points, covariance, config.verbose),
            jacobian: Vec::new(),
            transformed: Samples::default(),
            units: config.units,
            verbose: config.verbose,
        };
        t.assign(pars_x, pars_y);
        t.refresh();
        t
    }

    fn assign(&mut self, pars_x: &[f64], pars_y: &[f64]) {
        if self.verbose {
            for (axis, p) in [("x", pars_x), ("y", pars_y)] {
                let used = terms_used(p.len());
                if used < p.len() {
                    warn!(
                        "Polynom: {} {}-coefficients given, only the first {} are used",
                        p.len(),
                        axis,
                        used
                    );
                }
            }
        }
        self.pars_x = pars_x.to_vec();
        self.pars_y = pars_y.to_vec();
    }

    /// Replace the working data set.
    pub fn ingest_data(&mut self, points: PointSet, covariance: Vec<Matrix2>) {
        self.samples = Samples::new(points, covariance, self.verbose);
        self.refresh();
    }

    /// Replace the coefficients from a flat `[x-coeffs, y-coeffs]` vector.
    ///
    /// An empty vector is a no-op; an odd length is rejected.
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
        self.assign(px, py);
        self.refresh();
    }

    /// Recompute Jacobian, positions and covariances for the working data.
    pub fn refresh(&mut self) {
        self.jacobian = self.jacobian_at(&self.samples.points);
        let points = self.evaluate_position(&self.samples.points);
        let covariance = covariance::propagate(&self.jacobian, &self.samples.covariance);
        self.transformed = Samples {
            points,
            covariance,
        };
        debug!(
            "Polynom refreshed: {} x-terms, {} points",
            self.pars_x.len(),
            self.samples.len()
        );
    }

    /// Map raw positions through both series.
    pub fn evaluate_position(&self, points: &PointSet) -> PointSet {
        PointSet::new(
            points
                .iter()
                .map(|&(x, y)| (polyval2d(&self.pars_x, x, y), polyval2d(&self.pars_y, x, y)))
                .collect(),
        )
    }

    /// Per-point Jacobian at raw positions.
    pub fn jacobian_at(&self, points: &PointSet) -> Vec<Matrix2> {
        points
            .iter()
            .map(|&(x, y)| {
                let (xx, xy) = gradient2d(&self.pars_x, x, y);
                let (yx, yy) = gradient2d(&self.pars_y, x, y);
                Matrix2::new(xx, xy, yx, yy)
            })
            .collect()
    }

    /// Propagate covariances given at raw positions.
    pub fn propagate_covariance(&self, covariance: &[Matrix2], points: &PointSet) -> Vec<Matrix2> {
        covariance::propagate(&self.jacobian_at(points), covariance)
    }

    pub fn pars_x(&self) -> &[f64] {
        &self.pars_x
    }

    pub fn pars_y(&self) -> &[f64] {
        &self.pars_y
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn jacobian(&self) -> &[Matrix2] {
        &self.jacobian
    }

    pub fn transformed(&self) -> &Samples {
        &self.transformed
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}
