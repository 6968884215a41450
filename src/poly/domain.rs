//! Rescaling of raw `(x, y)` onto the `[-1, 1] × [-1, 1]` domain.
//!
//! ```text
//! xr = (2x − (xmax + xmin)) / (xmax − xmin)
//! yr = (2y − (ymax + ymin)) / (ymax − ymin)
//! ```
//!
//! The domain belongs to a fitted transform: once set it must stay fixed
//! when new data are pushed through, otherwise the coefficients silently
//! change meaning.

use crate::points::PointSet;
use crate::Matrix2;

/// Affine rescale bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

/// Optional user bounds; unset entries are filled from data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DomainBounds {
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
}

impl DomainBounds {
    /// All four bounds set.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin: Some(xmin),
            xmax: Some(xmax),
            ymin: Some(ymin),
            ymax: Some(ymax),
        }
    }
}

impl From<Domain> for DomainBounds {
    fn from(d: Domain) -> Self {
        DomainBounds::new(d.xmin, d.xmax, d.ymin, d.ymax)
    }
}

impl Default for Domain {
    fn default() -> Self {
        Domain::unit()
    }
}

impl Domain {
    /// Create a domain from explicit bounds. Zero-width spans are widened.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        let (xmin, xmax) = widen(xmin, xmax);
        let (ymin, ymax) = widen(ymin, ymax);
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// The `[-1, 1] × [-1, 1]` domain: rescaling is the identity.
    pub fn unit() -> Self {
        Self {
            xmin: -1.0,
            xmax: 1.0,
            ymin: -1.0,
            ymax: 1.0,
        }
    }

    /// Min/max of the data, or the unit domain with no data.
    pub fn from_points(points: &PointSet) -> Self {
        Domain::resolve(&DomainBounds::default(), points)
    }

    /// Fill unset bounds from the data (or ±1 with no data).
    pub fn resolve(bounds: &DomainBounds, points: &PointSet) -> Self {
        let (dxmin, dxmax, dymin, dymax) = points.bounds().unwrap_or((-1.0, 1.0, -1.0, 1.0));
        Domain::new(
            bounds.xmin.unwrap_or(dxmin),
            bounds.xmax.unwrap_or(dxmax),
            bounds.ymin.unwrap_or(dymin),
            bounds.ymax.unwrap_or(dymax),
        )
    }

    /// Rescale one point onto `[-1, 1]`.
    #[inline]
    pub fn rescale(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (2.0 * x - (self.xmax + self.xmin)) / (self.xmax - self.xmin),
            (2.0 * y - (self.ymax + self.ymin)) / (self.ymax - self.ymin),
        )
    }

    /// Map a rescaled point back to raw coordinates.
    #[inline]
    pub fn unscale(&self, xr: f64, yr: f64) -> (f64, f64) {
        (
            0.5 * (xr * (self.xmax - self.xmin) + self.xmax + self.xmin),
            0.5 * (yr * (self.ymax - self.ymin) + self.ymax + self.ymin),
        )
    }

    /// Rescale a whole point set.
    pub fn rescale_points(&self, points: &PointSet) -> PointSet {
        PointSet::new(points.iter().map(|&(x, y)| self.rescale(x, y)).collect())
    }

    /// `d(xr, yr) / d(x, y)`: `diag(2/(xmax−xmin), 2/(ymax−ymin))`.
    pub fn jacobian(&self) -> Matrix2 {
        Matrix2::new(
            2.0 / (self.xmax - self.xmin),
            0.0,
            0.0,
            2.0 / (self.ymax - self.ymin),
        )
    }
}

/// Widen a zero-width span so the rescale stays invertible.
///
/// Reversed spans are kept: they flip the sign of the rescaled axis.
fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if hi == lo {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    }
}
