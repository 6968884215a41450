//! 2D polynomial plane-to-plane transforms.
//!
//! Two realizations are provided:
//!
//! - [`PolyTransform`]: any of the [`PolyKind`] families at arbitrary
//!   degree, evaluated on inputs rescaled onto `[-1, 1]` by a fixed
//!   [`Domain`].
//! - [`Polynom`]: the power series only, hand-expanded up to fifth order
//!   and evaluated on raw inputs.
//!
//! Both share the flat coefficient order of [`coeffs`]. [`PatternMatrix`]
//! builds the matching least-squares design matrix.

pub mod basis;
pub mod coeffs;
pub mod domain;
pub mod pattern;
pub mod polynom;
pub mod transform;

pub use basis::{Axis, PolyKind, UnknownPolyKind};
pub use coeffs::{Degree, PolyCoeffs};
pub use domain::{Domain, DomainBounds};
pub use pattern::PatternMatrix;
pub use polynom::{Polynom, PolynomConfig};
pub use transform::{PolyConfig, PolyTransform};
