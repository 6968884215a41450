//! Flat ↔ triangular coefficient bookkeeping for 2D polynomials.
//!
//! A 2D polynomial of total degree `d` has `M = (d+1)(d+2)/2` coefficients
//! `c_ij` with `i + j ≤ d`, where `i` is the power (or basis index) in x
//! and `j` the power in y. Externally the coefficients travel as a flat
//! vector; for evaluation and differentiation they are laid out in a
//! `(d+1) × (d+1)` grid with only the upper-left triangle populated.
//!
//! Terms are enumerated in order of increasing total degree, then
//! increasing `j`:
//!
//! ```text
//!   d=0: (0,0)
//!   d=1: (1,0) (0,1)
//!   d=2: (2,0) (1,1) (0,2)
//!   d=3: (3,0) (2,1) (1,2) (0,3)
//! ```
//!
//! so a flat vector reads `[c00, c10, c01, c20, c11, c02, ...]`, i.e.
//! `1, x, y, x², xy, y², ...` for the power basis.

use nalgebra::DMatrix;
use tracing::warn;

/// Tolerance when deciding whether an inferred degree is an integer.
const DEGREE_TOLERANCE: f64 = 1.0e-3;

/// Polynomial degree inferred from a coefficient count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degree {
    /// The count corresponds to this total degree.
    Valid(usize),
    /// The count is not of the form `(d+1)(d+2)/2`.
    Invalid,
}

impl Degree {
    /// Infer the degree from a coefficient count.
    pub fn from_count(m: usize) -> Self {
        let d = degree_from_count(m);
        if d < 0.0 || (d - d.round()).abs() > DEGREE_TOLERANCE {
            return Degree::Invalid;
        }
        Degree::Valid(d.round() as usize)
    }

    /// The degree, if valid.
    pub fn value(self) -> Option<usize> {
        match self {
            Degree::Valid(d) => Some(d),
            Degree::Invalid => None,
        }
    }

    /// Returns `true` for a valid degree.
    pub fn is_valid(self) -> bool {
        matches!(self, Degree::Valid(_))
    }
}

/// Real-valued root `d` of `(d+1)(d+2)/2 = m`.
///
/// Callers check integrality; see [`Degree::from_count`].
pub fn degree_from_count(m: usize) -> f64 {
    (-3.0 + (1.0 + 8.0 * m as f64).sqrt()) / 2.0
}

/// Number of coefficients per axis for total degree `deg`.
pub fn num_coeffs(deg: usize) -> usize {
    (deg + 1) * (deg + 2) / 2
}

/// Flat index of the `(i, j)` term.
pub fn coeff_index(i: usize, j: usize) -> usize {
    let s = i + j;
    // terms for total degrees 0..s, then position j within degree s
    num_coeffs(s) - (s + 1) + j
}

/// All `(i, j)` pairs with `i + j ≤ deg`, in flat-vector order.
pub fn powers_for_degree(deg: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(num_coeffs(deg));
    for s in 0..=deg {
        for j in 0..=s {
            pairs.push((s - j, j));
        }
    }
    pairs
}

/// Lay a flat coefficient vector out as a `(d+1) × (d+1)` triangular grid.
///
/// Returns `None` if the length does not correspond to a degree.
pub fn flat_to_triangular(flat: &[f64]) -> Option<DMatrix<f64>> {
    let deg = Degree::from_count(flat.len()).value()?;
    let mut grid = DMatrix::zeros(deg + 1, deg + 1);
    for (&(i, j), &c) in powers_for_degree(deg).iter().zip(flat) {
        grid[(i, j)] = c;
    }
    Some(grid)
}

/// Read a triangular grid back into flat-vector order.
///
/// Entries outside the triangle `i + j ≤ deg` are ignored.
pub fn triangular_to_flat(grid: &DMatrix<f64>) -> Vec<f64> {
    let deg = grid.nrows().min(grid.ncols()).saturating_sub(1);
    powers_for_degree(deg)
        .into_iter()
        .map(|(i, j)| grid[(i, j)])
        .collect()
}

/// Coefficients of one output axis, in both flat and triangular form.
#[derive(Debug, Clone)]
pub struct PolyCoeffs {
    flat: Vec<f64>,
    degree: Degree,
    grid: DMatrix<f64>,
    verbose: bool,
}

impl PolyCoeffs {
    /// Ingest a flat coefficient vector.
    ///
    /// An invalid length leaves the degree [`Degree::Invalid`] and the grid
    /// empty; evaluation then yields nothing until valid coefficients
    /// arrive through [`update`](Self::update).
    pub fn new(flat: &[f64], verbose: bool) -> Self {
        let mut coeffs = Self {
            flat: Vec::new(),
            degree: Degree::Invalid,
            grid: DMatrix::zeros(0, 0),
            verbose,
        };
        coeffs.assign(flat);
        coeffs
    }

    /// Replace the coefficients. An empty slice is a no-op.
    pub fn update(&mut self, flat: &[f64]) {
        if flat.is_empty() {
            return;
        }
        self.assign(flat);
    }

    fn assign(&mut self, flat: &[f64]) {
        self.flat = flat.to_vec();
        self.degree = Degree::from_count(flat.len());
        match flat_to_triangular(flat) {
            Some(grid) => self.grid = grid,
            None => {
                if self.verbose {
                    warn!(
                        "{} coefficients do not correspond to a polynomial degree",
                        flat.len()
                    );
                }
                self.grid = DMatrix::zeros(0, 0);
            }
        }
    }

    /// Flat coefficients as last supplied.
    pub fn flat(&self) -> &[f64] {
        &self.flat
    }

    /// Inferred degree.
    pub fn degree(&self) -> Degree {
        self.degree
    }

    /// Triangular coefficient grid (`0 × 0` when the degree is invalid).
    pub fn grid(&self) -> &DMatrix<f64> {
        &self.grid
    }

    /// Returns `true` when the grid is populated.
    pub fn is_valid(&self) -> bool {
        self.degree.is_valid()
    }

    /// Parameter labels `<prefix>_ij` in flat-vector order.
    pub fn labels(&self, prefix: &str) -> Vec<String> {
        match self.degree {
            Degree::Valid(d) => powers_for_degree(d)
                .into_iter()
                .map(|(i, j)| format!("{prefix}_{i}{j}"))
                .collect(),
            Degree::Invalid => Vec::new(),
        }
    }
}
