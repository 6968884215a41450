//! Composed transforms driven by a single flat parameter vector.
//!
//! - [`XyToEqu`]: detector plane → tangent plane → sky, with positions,
//!   Jacobians and covariances carried end to end.
//! - [`TangentPlane`]: detector positions and independently observed sky
//!   positions both brought onto the tangent plane for comparison.
//!
//! Both take parameters laid out as in [`ParameterVector`](crate::params::ParameterVector).

mod tangent_plane;
mod xy_to_equ;

pub use tangent_plane::TangentPlane;
pub use xy_to_equ::XyToEqu;

use crate::gnomonic::GnomonicConfig;
use crate::poly::PolyConfig;
use crate::units::Units;

/// Configuration shared by the chained transforms.
#[derive(Debug, Clone, Default)]
pub struct ChainConfig {
    /// Detector → tangent plane polynomial.
    pub poly: PolyConfig,
    /// Units of tangent-plane and sky coordinates and of the tangent point.
    pub sky_units: Units,
    /// Surface configuration warnings from every stage.
    pub verbose: bool,
}

impl ChainConfig {
    fn poly_config(&self) -> PolyConfig {
        PolyConfig {
            verbose: self.verbose || self.poly.verbose,
            ..self.poly.clone()
        }
    }

    fn gnomonic_config(&self) -> GnomonicConfig {
        GnomonicConfig {
            units: self.sky_units,
            verbose: self.verbose,
        }
    }
}
