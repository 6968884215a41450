//! Polynomial basis families.
//!
//! Five interchangeable families share the same triangular coefficient
//! layout. Each family supplies:
//!
//! - the 1D basis values `B_0(x) .. B_d(x)` (one Vandermonde row),
//! - differentiation of a 1D coefficient series in its own basis,
//!
//! from which 2D evaluation `Σ c_ij B_i(x) B_j(y)` and axis-wise
//! differentiation of a coefficient grid follow.
//!
//! | family      | recurrence                                         |
//! |-------------|----------------------------------------------------|
//! | Polynomial  | `x^k`                                              |
//! | Chebyshev   | `T_{k+1} = 2x T_k − T_{k−1}`                       |
//! | Legendre    | `(k+1) P_{k+1} = (2k+1) x P_k − k P_{k−1}`          |
//! | Hermite     | `H_{k+1} = 2x H_k − 2k H_{k−1}` (physicists')      |
//! | HermiteE    | `He_{k+1} = x He_k − k He_{k−1}` (probabilists')   |
//!
//! The orthogonal families are meant for inputs rescaled to `[-1, 1]`.

use std::fmt;
use std::str::FromStr;

use nalgebra::DMatrix;
use tracing::warn;

/// Which polynomial family a transform is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolyKind {
    /// Ordinary power series.
    #[default]
    Polynomial,
    /// Chebyshev polynomials of the first kind.
    Chebyshev,
    /// Legendre polynomials.
    Legendre,
    /// Physicists' Hermite polynomials.
    Hermite,
    /// Probabilists' Hermite polynomials.
    HermiteE,
}

/// Axis of a coefficient grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// First index (powers of x).
    X,
    /// Second index (powers of y).
    Y,
}

impl PolyKind {
    /// All supported families.
    pub const ALL: [PolyKind; 5] = [
        PolyKind::Polynomial,
        PolyKind::Chebyshev,
        PolyKind::Legendre,
        PolyKind::Hermite,
        PolyKind::HermiteE,
    ];

    /// Family name as used in configuration.
    pub fn name(self) -> &'static str {
        match self {
            PolyKind::Polynomial => "Polynomial",
            PolyKind::Chebyshev => "Chebyshev",
            PolyKind::Legendre => "Legendre",
            PolyKind::Hermite => "Hermite",
            PolyKind::HermiteE => "HermiteE",
        }
    }

    /// Look up a family by name, falling back to [`PolyKind::Polynomial`]
    /// for anything unsupported.
    pub fn from_name_or_default(name: &str, verbose: bool) -> Self {
        name.parse().unwrap_or_else(|_| {
            if verbose {
                warn!("Polynomial kind {name:?} not supported, defaulting to Polynomial");
            }
            PolyKind::Polynomial
        })
    }

    /// Basis values `B_0(x) .. B_deg(x)`.
    pub fn basis_values(self, x: f64, deg: usize) -> Vec<f64> {
        let mut v = Vec::with_capacity(deg + 1);
        v.push(1.0);
        if deg == 0 {
            return v;
        }
        v.push(match self {
            PolyKind::Hermite => 2.0 * x,
            _ => x,
        });
        for k in 1..deg {
            let kf = k as f64;
            let next = match self {
                PolyKind::Polynomial => v[k] * x,
                PolyKind::Chebyshev => 2.0 * x * v[k] - v[k - 1],
                PolyKind::Legendre => ((2.0 * kf + 1.0) * x * v[k] - kf * v[k - 1]) / (kf + 1.0),
                PolyKind::Hermite => 2.0 * x * v[k] - 2.0 * kf * v[k - 1],
                PolyKind::HermiteE => x * v[k] - kf * v[k - 1],
            };
            v.push(next);
        }
        v
    }

    /// Differentiate a 1D series once. The result has one fewer term
    /// (a constant series differentiates to `[0]`).
    pub fn differentiate(self, c: &[f64]) -> Vec<f64> {
        let n = c.len();
        if n <= 1 {
            return vec![0.0];
        }
        let mut c = c.to_vec();
        let mut der = vec![0.0; n - 1];
        match self {
            PolyKind::Polynomial => {
                for k in 1..n {
                    der[k - 1] = k as f64 * c[k];
                }
            }
            PolyKind::Chebyshev => {
                // T'_j expands over T_{j-1}, T_{j-3}, ...; fold downward
                for j in (3..n).rev() {
                    let jf = j as f64;
                    der[j - 1] = 2.0 * jf * c[j];
                    c[j - 2] += jf * c[j] / (jf - 2.0);
                }
                if n > 2 {
                    der[1] = 4.0 * c[2];
                }
                der[0] = c[1];
            }
            PolyKind::Legendre => {
                for j in (3..n).rev() {
                    der[j - 1] = (2.0 * j as f64 - 1.0) * c[j];
                    c[j - 2] += c[j];
                }
                if n > 2 {
                    der[1] = 3.0 * c[2];
                }
                der[0] = c[1];
            }
            PolyKind::Hermite => {
                for k in 1..n {
                    der[k - 1] = 2.0 * k as f64 * c[k];
                }
            }
            PolyKind::HermiteE => {
                for k in 1..n {
                    der[k - 1] = k as f64 * c[k];
                }
            }
        }
        der
    }

    /// Evaluate a 1D series `Σ c_k B_k(x)`.
    pub fn eval(self, x: f64, c: &[f64]) -> f64 {
        if c.is_empty() {
            return 0.0;
        }
        self.basis_values(x, c.len() - 1)
            .iter()
            .zip(c)
            .map(|(b, c)| b * c)
            .sum()
    }

    /// Evaluate a 2D coefficient grid: `Σ c_ij B_i(x) B_j(y)`.
    pub fn eval2d(self, x: f64, y: f64, grid: &DMatrix<f64>) -> f64 {
        let (nx, ny) = grid.shape();
        if nx == 0 || ny == 0 {
            return 0.0;
        }
        let bx = self.basis_values(x, nx - 1);
        let by = self.basis_values(y, ny - 1);
        let mut sum = 0.0;
        for i in 0..nx {
            let mut row = 0.0;
            for j in 0..ny {
                row += grid[(i, j)] * by[j];
            }
            sum += bx[i] * row;
        }
        sum
    }

    /// Differentiate a coefficient grid once along `axis`, zero-padding the
    /// result back to the input shape so the degree bookkeeping holds.
    pub fn differentiate2d(self, grid: &DMatrix<f64>, axis: Axis) -> DMatrix<f64> {
        let (nx, ny) = grid.shape();
        let mut out = DMatrix::zeros(nx, ny);
        match axis {
            Axis::X => {
                for j in 0..ny {
                    let col: Vec<f64> = (0..nx).map(|i| grid[(i, j)]).collect();
                    for (i, d) in self.differentiate(&col).into_iter().enumerate().take(nx) {
                        out[(i, j)] = d;
                    }
                }
            }
            Axis::Y => {
                for i in 0..nx {
                    let row: Vec<f64> = (0..ny).map(|j| grid[(i, j)]).collect();
                    for (j, d) in self.differentiate(&row).into_iter().enumerate().take(ny) {
                        out[(i, j)] = d;
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for PolyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown family name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolyKind(pub String);

impl fmt::Display for UnknownPolyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown polynomial kind: {}", self.0)
    }
}

impl std::error::Error for UnknownPolyKind {}

impl FromStr for PolyKind {
    type Err = UnknownPolyKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PolyKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| UnknownPolyKind(s.to_string()))
    }
}
