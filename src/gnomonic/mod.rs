//! Gnomonic (TAN) projection between the tangent plane and the sky.
//!
//! [`projection`] holds the closed-form maps and Jacobians in radians;
//! [`Gnomonic`] wraps one direction of them around a tangent point and a
//! working data set, converting units on the way in and out.
//!
//! The two directions are mutually inverse, and so are their Jacobians at
//! corresponding points:
//!
//! ```text
//! J_forward(α, δ) · J_inverse(ξ, η) = I
//! ```

pub mod projection;
pub mod transform;

pub use projection::{inverse_tan_jacobian, inverse_tan_project, tan_jacobian, tan_project};
pub use transform::{Direction, Gnomonic, GnomonicConfig};
