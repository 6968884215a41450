//! Point sets and their per-point covariances.
//!
//! A [`PointSet`] is an ordered batch of `(x, y)` coordinates whose frame
//! (detector, tangent plane or equatorial) is implied by the transform that
//! owns it. [`Samples`] pairs a point set with one 2×2 covariance per point.

use tracing::warn;

use crate::Matrix2;

/// Ordered batch of 2D coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    /// Coordinates as `(x, y)` pairs.
    pub coords: Vec<(f64, f64)>,
}

impl PointSet {
    /// Create a point set from `(x, y)` pairs.
    pub fn new(coords: Vec<(f64, f64)>) -> Self {
        Self { coords }
    }

    /// Create a point set from separate x and y arrays.
    ///
    /// Pairs are formed element-wise; a longer array is truncated to the
    /// length of the shorter one.
    pub fn from_xy(x: &[f64], y: &[f64]) -> Self {
        Self {
            coords: x.iter().zip(y).map(|(&x, &y)| (x, y)).collect(),
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Returns `true` if there are no points.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Iterate over the `(x, y)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.coords.iter()
    }

    /// The x coordinates as a new vector.
    pub fn xs(&self) -> Vec<f64> {
        self.coords.iter().map(|p| p.0).collect()
    }

    /// The y coordinates as a new vector.
    pub fn ys(&self) -> Vec<f64> {
        self.coords.iter().map(|p| p.1).collect()
    }

    /// A copy of this point set with every point shifted by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            coords: self.coords.iter().map(|&(x, y)| (x + dx, y + dy)).collect(),
        }
    }

    /// Bounding box `(xmin, xmax, ymin, ymax)`, or `None` for an empty set.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        if self.coords.is_empty() {
            return None;
        }
        let mut b = (
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        );
        for &(x, y) in &self.coords {
            b.0 = b.0.min(x);
            b.1 = b.1.max(x);
            b.2 = b.2.min(y);
            b.3 = b.3.max(y);
        }
        Some(b)
    }
}

impl From<Vec<(f64, f64)>> for PointSet {
    fn from(coords: Vec<(f64, f64)>) -> Self {
        Self { coords }
    }
}

/// A point set together with its covariance field.
///
/// The covariance field is either empty or holds exactly one symmetric
/// 2×2 matrix per point.
#[derive(Debug, Clone, Default)]
pub struct Samples {
    /// Positions.
    pub points: PointSet,
    /// Per-point covariance matrices (empty if none were supplied).
    pub covariance: Vec<Matrix2>,
}

impl Samples {
    /// Pair positions with covariances.
    ///
    /// If the covariance count disagrees with the point count the
    /// covariances are dropped and the field is left empty.
    pub fn new(points: PointSet, covariance: Vec<Matrix2>, verbose: bool) -> Self {
        if !covariance.is_empty() && covariance.len() != points.len() {
            if verbose {
                warn!(
                    "Covariance count {} does not match point count {}; covariances ignored",
                    covariance.len(),
                    points.len()
                );
            }
            return Self {
                points,
                covariance: Vec::new(),
            };
        }
        Self { points, covariance }
    }

    /// Positions only, no covariance.
    pub fn positions(points: PointSet) -> Self {
        Self {
            points,
            covariance: Vec::new(),
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if there are no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns `true` if a covariance is present for every point.
    pub fn has_covariance(&self) -> bool {
        !self.covariance.is_empty() && self.covariance.len() == self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_xy_truncates() {
        let p = PointSet::from_xy(&[1.0, 2.0, 3.0], &[4.0, 5.0]);
        assert_eq!(p.coords, vec![(1.0, 4.0), (2.0, 5.0)]);
        assert_eq!(p.xs(), vec![1.0, 2.0]);
        assert_eq!(p.ys(), vec![4.0, 5.0]);
    }

    #[test]
    fn test_bounds() {
        assert!(PointSet::default().bounds().is_none());
        let p = PointSet::new(vec![(1.0, -2.0), (-3.0, 4.0), (0.5, 0.0)]);
        assert_eq!(p.bounds(), Some((-3.0, 1.0, -2.0, 4.0)));
    }

    #[test]
    fn test_offset() {
        let p = PointSet::new(vec![(1.0, 1.0)]).offset(0.5, -0.25);
        assert_eq!(p.coords, vec![(1.5, 0.75)]);
    }

    #[test]
    fn test_mismatched_covariance_dropped() {
        let pts = PointSet::new(vec![(0.0, 0.0), (1.0, 1.0)]);
        let s = Samples::new(pts.clone(), vec![Matrix2::identity()], false);
        assert_eq!(s.len(), 2);
        assert!(s.covariance.is_empty());
        assert!(!s.has_covariance());

        let s = Samples::new(pts, vec![Matrix2::identity(); 2], false);
        assert!(s.has_covariance());
    }
}
