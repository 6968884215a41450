//! Pattern (design) matrix for linear least-squares fits of 2D polynomials.
//!
//! For each sample point the pattern block is `2 × 2M`:
//!
//! ```text
//! | v_0 .. v_{M-1}   0   ..   0     |
//! |   0   ..   0    v_0 .. v_{M-1}  |
//! ```
//!
//! where `v_k = B_i(xr) B_j(yr)` for the `k`-th `(i, j)` of
//! [`powers_for_degree`]. Left-multiplied onto `[x-coeffs, y-coeffs]` this
//! reproduces [`PolyTransform::evaluate_position`](super::PolyTransform::evaluate_position)
//! on the same domain.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use super::basis::PolyKind;
use super::coeffs::{num_coeffs, powers_for_degree};
use super::domain::Domain;
use crate::points::PointSet;
use crate::Matrix2;

/// Per-point pattern blocks for one degree and basis family.
#[derive(Debug, Clone)]
pub struct PatternMatrix {
    degree: usize,
    kind: PolyKind,
    domain: Domain,
    powers: Vec<(usize, usize)>,
    /// Selected Vandermonde rows, `N × M`.
    vander: DMatrix<f64>,
}

impl PatternMatrix {
    /// Build from sample points, rescaling onto their own min/max.
    ///
    /// With `no_rescale` the points are used as given.
    pub fn new(points: &PointSet, degree: usize, kind: PolyKind, no_rescale: bool) -> Self {
        let domain = if no_rescale {
            Domain::unit()
        } else {
            Domain::from_points(points)
        };
        Self::with_domain(points, degree, kind, domain)
    }

    /// Build on a fixed domain, e.g. the one of an existing transform.
    pub fn with_domain(points: &PointSet, degree: usize, kind: PolyKind, domain: Domain) -> Self {
        let powers = powers_for_degree(degree);
        let m = powers.len();
        let mut vander = DMatrix::zeros(points.len(), m);
        for (row, &(x, y)) in points.iter().enumerate() {
            let (xr, yr) = domain.rescale(x, y);
            let bx = kind.basis_values(xr, degree);
            let by = kind.basis_values(yr, degree);
            for (col, &(i, j)) in powers.iter().enumerate() {
                vander[(row, col)] = bx[i] * by[j];
            }
        }
        debug!(
            "Pattern matrix: {} points, degree {}, {} terms per axis ({})",
            points.len(),
            degree,
            m,
            kind
        );
        Self {
            degree,
            kind,
            domain,
            powers,
            vander,
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn kind(&self) -> PolyKind {
        self.kind
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// `(i, j)` powers of the columns in each half.
    pub fn powers(&self) -> &[(usize, usize)] {
        &self.powers
    }

    /// Number of sample points.
    pub fn len(&self) -> usize {
        self.vander.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.vander.nrows() == 0
    }

    /// Terms per axis, `M`.
    pub fn num_terms(&self) -> usize {
        num_coeffs(self.degree)
    }

    /// Selected Vandermonde values, one row per point.
    pub fn vander(&self) -> &DMatrix<f64> {
        &self.vander
    }

    /// The `2 × 2M` block of point `k`, or `None` out of range.
    pub fn block(&self, k: usize) -> Option<DMatrix<f64>> {
        if k >= self.len() {
            return None;
        }
        let m = self.num_terms();
        let mut p = DMatrix::zeros(2, 2 * m);
        for col in 0..m {
            let v = self.vander[(k, col)];
            p[(0, col)] = v;
            p[(1, m + col)] = v;
        }
        Some(p)
    }

    /// All blocks stacked into a `2N × 2M` design matrix (rows `2k`, `2k+1`
    /// belong to point `k`).
    pub fn design_matrix(&self) -> DMatrix<f64> {
        let (n, m) = (self.len(), self.num_terms());
        let mut a = DMatrix::zeros(2 * n, 2 * m);
        for k in 0..n {
            for col in 0..m {
                let v = self.vander[(k, col)];
                a[(2 * k, col)] = v;
                a[(2 * k + 1, m + col)] = v;
            }
        }
        a
    }

    /// Model positions for a flat `[x-coeffs, y-coeffs]` vector.
    ///
    /// Returns an empty set if the vector length is not `2M`.
    pub fn apply(&self, pars: &[f64]) -> PointSet {
        let m = self.num_terms();
        if pars.len() != 2 * m {
            return PointSet::default();
        }
        let px = DVector::from_column_slice(&pars[..m]);
        let py = DVector::from_column_slice(&pars[m..]);
        let xs = &self.vander * px;
        let ys = &self.vander * py;
        PointSet::new(xs.iter().zip(ys.iter()).map(|(&x, &y)| (x, y)).collect())
    }

    /// Assemble normal equations `H = Σ PᵀWP`, `β = Σ PᵀWε`.
    ///
    /// `weights` are per-point 2×2 weight (inverse covariance) matrices;
    /// `None` weights every point by the identity. Returns `None` if
    /// `targets` or `weights` disagree with the point count.
    pub fn normal_equations(
        &self,
        targets: &PointSet,
        weights: Option<&[Matrix2]>,
    ) -> Option<(DMatrix<f64>, DVector<f64>)> {
        let n = self.len();
        if targets.len() != n {
            return None;
        }
        if let Some(w) = weights {
            if w.len() != n {
                return None;
            }
        }
        let dim = 2 * self.num_terms();
        let mut hessian = DMatrix::zeros(dim, dim);
        let mut beta = DVector::zeros(dim);
        for (k, &(tx, ty)) in targets.iter().enumerate() {
            let Some(p) = self.block(k) else {
                continue;
            };
            let w = weights.map_or_else(Matrix2::identity, |w| w[k]);
            let w = DMatrix::from_column_slice(2, 2, w.as_slice());
            let ptw = p.transpose() * w;
            hessian += &ptw * &p;
            beta += &ptw * DVector::from_column_slice(&[tx, ty]);
        }
        Some((hessian, beta))
    }
}
