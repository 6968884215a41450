//! One-directional gnomonic transforms with cached working state.

use tracing::{debug, warn};

use super::projection::{inverse_tan_jacobian, inverse_tan_project, tan_jacobian, tan_project};
use crate::covariance;
use crate::points::{PointSet, Samples};
use crate::units::Units;
use crate::Matrix2;

/// Direction of a [`Gnomonic`] transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Tangent plane `(ξ, η)` → equatorial `(α, δ)`.
    TanToEqu,
    /// Equatorial `(α, δ)` → tangent plane `(ξ, η)`.
    EquToTan,
}

impl Direction {
    /// Names of the input and output coordinates.
    pub fn axis_names(self) -> ([&'static str; 2], [&'static str; 2]) {
        match self {
            Direction::TanToEqu => (["xi", "eta"], ["alpha", "delta"]),
            Direction::EquToTan => (["alpha", "delta"], ["xi", "eta"]),
        }
    }
}

/// Configuration for a [`Gnomonic`] transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct GnomonicConfig {
    /// Unit convention of positions and of the tangent point.
    pub units: Units,
    /// Surface configuration warnings through `tracing`.
    pub verbose: bool,
}

/// Gnomonic projection in one direction about a tangent point.
///
/// Positions, the tangent point and the outputs all share one unit
/// convention; the maps run in radians internally. The Jacobian is
/// dimensionless in either convention.
#[derive(Debug, Clone)]
pub struct Gnomonic {
    direction: Direction,
    tangent_point: [f64; 2],
    units: Units,
    verbose: bool,
    samples: Samples,
    jacobian: Vec<Matrix2>,
    transformed: Samples,
}

impl Gnomonic {
    /// Create a transform with no working data.
    pub fn new(direction: Direction, config: &GnomonicConfig, tangent_point: [f64; 2]) -> Self {
        Self::with_data(direction, config, tangent_point, PointSet::default(), Vec::new())
    }

    /// Tangent plane → equatorial.
    pub fn tan_to_equ(config: &GnomonicConfig, tangent_point: [f64; 2]) -> Self {
        Self::new(Direction::TanToEqu, config, tangent_point)
    }

    /// Equatorial → tangent plane.
    pub fn equ_to_tan(config: &GnomonicConfig, tangent_point: [f64; 2]) -> Self {
        Self::new(Direction::EquToTan, config, tangent_point)
    }

    /// Create a transform and ingest a working data set.
    pub fn with_data(
        direction: Direction,
        config: &GnomonicConfig,
        tangent_point: [f64; 2],
        points: PointSet,
        covariance: Vec<Matrix2>,
    ) -> Self {
        let mut t = Self {
            direction,
            tangent_point,
            units: config.units,
            verbose: config.verbose,
            samples: Samples::new(points, covariance, config.verbose),
            jacobian: Vec::new(),
            transformed: Samples::default(),
        };
        t.refresh();
        t
    }

    /// Replace the working data set.
    pub fn ingest_data(&mut self, points: PointSet, covariance: Vec<Matrix2>) {
        self.samples = Samples::new(points, covariance, self.verbose);
        self.refresh();
    }

    /// Replace the tangent point from a `[α0, δ0]` slice.
    ///
    /// Anything other than exactly two values is ignored.
    pub fn update_transform(&mut self, pars: &[f64]) {
        match pars {
            [a0, d0] => self.set_tangent_point([*a0, *d0]),
            _ => {
                if self.verbose {
                    warn!(
                        "Tangent point needs 2 parameters, got {}; transform unchanged",
                        pars.len()
                    );
                }
            }
        }
    }

    /// Replace the tangent point and recompute against the working data.
    pub fn set_tangent_point(&mut self, tangent_point: [f64; 2]) {
        self.tangent_point = tangent_point;
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
            "Gnomonic {:?} refreshed at ({}, {}): {} points",
            self.direction,
            self.tangent_point[0],
            self.tangent_point[1],
            self.samples.len()
        );
    }

    /// Map positions through the projection.
    ///
    /// Points on or behind the tangent plane map to `NaN` in the forward
    /// direction.
    pub fn evaluate_position(&self, points: &PointSet) -> PointSet {
        let conv = self.units.to_radians();
        let a0 = self.tangent_point[0] * conv;
        let d0 = self.tangent_point[1] * conv;
        let mut behind = 0usize;
        let coords = points
            .iter()
            .map(|&(x, y)| {
                let (u, v) = match self.direction {
                    Direction::TanToEqu => inverse_tan_project(x * conv, y * conv, a0, d0),
                    Direction::EquToTan => tan_project(x * conv, y * conv, a0, d0)
                        .unwrap_or_else(|| {
                            behind += 1;
                            (f64::NAN, f64::NAN)
                        }),
                };
                (u / conv, v / conv)
            })
            .collect();
        if behind > 0 && self.verbose {
            warn!("{} points lie behind the tangent plane", behind);
        }
        PointSet::new(coords)
    }

    /// Per-point Jacobian at the given positions.
    pub fn jacobian_at(&self, points: &PointSet) -> Vec<Matrix2> {
        let conv = self.units.to_radians();
        let a0 = self.tangent_point[0] * conv;
        let d0 = self.tangent_point[1] * conv;
        points
            .iter()
            .map(|&(x, y)| match self.direction {
                Direction::TanToEqu => inverse_tan_jacobian(x * conv, y * conv, d0),
                Direction::EquToTan => tan_jacobian(x * conv, y * conv, a0, d0)
                    .unwrap_or_else(|| Matrix2::from_element(f64::NAN)),
            })
            .collect()
    }

    /// Propagate covariances given at the supplied positions.
    pub fn propagate_covariance(&self, covariance: &[Matrix2], points: &PointSet) -> Vec<Matrix2> {
        covariance::propagate(&self.jacobian_at(points), covariance)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn tangent_point(&self) -> [f64; 2] {
        self.tangent_point
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

    /// Labels of the transform parameters.
    pub fn labels(&self) -> Vec<String> {
        vec!["alpha0".to_string(), "delta0".to_string()]
    }
}
