//! Flat parameter vectors for chained transforms.
//!
//! Layout: `[α0, δ0, x-coeffs.., y-coeffs..]`. The x and y halves hold
//! either a full set of `M = (d+1)(d+2)/2` coefficients or `M − 1`
//! coefficients with the constant term left out. In the second case the
//! tangent point absorbs the constant offset, a zero constant is prepended
//! to each half, and [`ParameterVector::has_xy0`] is `false`.

use std::fmt;

use crate::poly::coeffs::{powers_for_degree, Degree};

/// Why a flat parameter vector could not be ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// Fewer than the two tangent-point values.
    TooShort(usize),
    /// The coefficient part cannot be split into equal x/y halves.
    OddCount(usize),
    /// A half-length fits no polynomial degree, with or without a constant term.
    NotPolynomial(usize),
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::TooShort(n) => {
                write!(f, "parameter vector has {} values, need at least 2", n)
            }
            ParamError::OddCount(n) => {
                write!(f, "{} polynomial coefficients cannot be split into x/y halves", n)
            }
            ParamError::NotPolynomial(n) => {
                write!(f, "{} coefficients per axis do not correspond to a polynomial degree", n)
            }
        }
    }
}

impl std::error::Error for ParamError {}

/// Tangent point plus x/y polynomial coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterVector {
    /// `[α0, δ0]`.
    pub tangent_point: [f64; 2],
    /// Full x coefficients, constant term included.
    pub coeffs_x: Vec<f64>,
    /// Full y coefficients, constant term included.
    pub coeffs_y: Vec<f64>,
    /// Whether the external vector carries the constant terms.
    pub has_xy0: bool,
}

impl ParameterVector {
    /// Split a flat vector into tangent point and coefficients.
    ///
    /// A vector of exactly two values carries the tangent point only and
    /// yields empty coefficient sets.
    pub fn ingest(pars: &[f64]) -> Result<Self, ParamError> {
        let [a0, d0, rest @ ..] = pars else {
            return Err(ParamError::TooShort(pars.len()));
        };
        let mut pv = ParameterVector {
            tangent_point: [*a0, *d0],
            coeffs_x: Vec::new(),
            coeffs_y: Vec::new(),
            has_xy0: true,
        };
        if rest.is_empty() {
            return Ok(pv);
        }
        if rest.len() % 2 != 0 {
            return Err(ParamError::OddCount(rest.len()));
        }
        let (px, py) = rest.split_at(rest.len() / 2);
        let m = px.len();
        if Degree::from_count(m).is_valid() {
            pv.coeffs_x = px.to_vec();
            pv.coeffs_y = py.to_vec();
        } else if Degree::from_count(m + 1).is_valid() {
            pv.coeffs_x = std::iter::once(0.0).chain(px.iter().copied()).collect();
            pv.coeffs_y = std::iter::once(0.0).chain(py.iter().copied()).collect();
            pv.has_xy0 = false;
        } else {
            return Err(ParamError::NotPolynomial(m));
        }
        Ok(pv)
    }

    /// Take over a newly ingested vector.
    ///
    /// A tangent-point-only update keeps the current coefficients, matching
    /// the polynomial stage, which ignores empty coefficient sets.
    pub fn absorb(&mut self, update: ParameterVector) {
        if update.coeffs_x.is_empty() {
            self.tangent_point = update.tangent_point;
        } else {
            *self = update;
        }
    }

    /// Polynomial degree of the coefficient sets.
    pub fn degree(&self) -> Degree {
        Degree::from_count(self.coeffs_x.len())
    }

    /// Coefficients as `[x-coeffs, y-coeffs]`, constants included.
    pub fn poly_parameters(&self) -> Vec<f64> {
        let mut p = self.coeffs_x.clone();
        p.extend_from_slice(&self.coeffs_y);
        p
    }

    /// The external flat vector this was ingested from.
    pub fn to_flat(&self) -> Vec<f64> {
        let skip = usize::from(!self.has_xy0);
        let mut p = self.tangent_point.to_vec();
        p.extend(self.coeffs_x.iter().skip(skip));
        p.extend(self.coeffs_y.iter().skip(skip));
        p
    }

    /// Indices in the external flat vector of the affine terms
    /// `(a, b, c, d, e, f)` of `ξ = a + b·x + c·y`, `η = d + e·x + f·y`.
    ///
    /// Without constant terms, `a` and `d` are carried by `α0` and `δ0`.
    /// `None` below degree 1.
    pub fn affine_indices(&self) -> Option<[usize; 6]> {
        match self.degree() {
            Degree::Valid(d) if d >= 1 => {}
            _ => return None,
        }
        if self.has_xy0 {
            let m = self.coeffs_x.len();
            Some([2, 3, 4, 2 + m, 3 + m, 4 + m])
        } else {
            let m = self.coeffs_x.len() - 1;
            Some([0, 2, 3, 1, 2 + m, 3 + m])
        }
    }

    /// Labels of the external flat vector.
    pub fn labels(&self, prefix_x: &str, prefix_y: &str) -> Vec<String> {
        let mut labels = vec!["alpha0".to_string(), "delta0".to_string()];
        let Some(deg) = self.degree().value() else {
            return labels;
        };
        let skip = usize::from(!self.has_xy0);
        for prefix in [prefix_x, prefix_y] {
            labels.extend(
                powers_for_degree(deg)
                    .into_iter()
                    .skip(skip)
                    .map(|(i, j)| format!("{prefix}_{i}{j}")),
            );
        }
        labels
    }
}
