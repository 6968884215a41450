//! # astrocov
//!
//! Propagate astrometric **positions and their 2×2 covariances** between a
//! detector plane, the gnomonic tangent plane and the celestial sphere, with
//! a closed-form Jacobian for every step.
//!
//! ## Features
//!
//! - **Polynomial plane maps**: power series, Chebyshev, Legendre, Hermite
//!   and HermiteE bases of any degree, on a fixed `[-1, 1]` domain
//! - **Gnomonic projection**: tangent plane ↔ equatorial in both directions
//! - **Chains**: detector → tangent plane → sky, driven by one flat parameter
//!   vector `[α0, δ0, x-coeffs, y-coeffs]`
//! - **Covariance propagation**: `C' = J·C·Jᵀ` per point, with Jacobians
//!   composed across stages
//! - **Pattern matrices**: the linear least-squares design matrix for the
//!   same polynomial parameterization, plus normal-equation assembly
//!
//! ## Example
//!
//! ```
//! use astrocov::{covariance, ChainConfig, PointSet, PolyConfig, XyToEqu};
//!
//! // raw pixels in, 1 pixel = 1 arcsec, tangent point at (35°, 35°)
//! let config = ChainConfig {
//!     poly: PolyConfig { no_rescale: true, ..Default::default() },
//!     ..Default::default()
//! };
//! let s = 1.0 / 3600.0;
//! let pars = [35.0, 35.0, 0.0, s, 0.0, 0.0, 0.0, s];
//!
//! let pixels = PointSet::new(vec![(0.0, 0.0), (1200.0, -800.0)]);
//! let cov = vec![covariance::from_sigmas(0.2, 0.2, 0.0); 2];
//!
//! let chain = XyToEqu::with_data(&config, &pars, pixels, cov).unwrap();
//! let (ra, dec) = chain.transformed().points.coords[1];
//! let sky_cov = chain.transformed().covariance[1];
//! println!("({ra:.6}, {dec:.6}) ± {:.3e}", sky_cov[(0, 0)].sqrt());
//! ```
//!
//! ## Conventions
//!
//! - Angles are in degrees unless a transform is configured with
//!   [`Units::Radians`]; gnomonic maps work in radians internally.
//! - Polynomial coefficients run `1, x, y, x², xy, y², x³, ...`.
//! - A Jacobian maps input displacements to output displacements; rows are
//!   outputs, columns inputs.

pub mod chain;
pub mod covariance;
pub mod deltas;
pub mod gnomonic;
pub mod grid;
pub mod params;
pub mod points;
pub mod poly;
pub mod transform;
pub mod units;

pub use chain::{ChainConfig, TangentPlane, XyToEqu};
pub use deltas::{check_deltas, DeltaCheck};
pub use gnomonic::{Direction, Gnomonic, GnomonicConfig};
pub use params::{ParamError, ParameterVector};
pub use points::{PointSet, Samples};
pub use poly::{
    Degree, Domain, DomainBounds, PatternMatrix, PolyConfig, PolyKind, PolyTransform, Polynom,
    PolynomConfig,
};
pub use transform::Transform;
pub use units::Units;

// Per-point Jacobians and covariances
pub type Matrix2 = nalgebra::Matrix2<f64>;
