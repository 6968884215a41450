//! Unit conventions for positions handed to the transforms.
//!
//! Angular frames (tangent plane, equatorial) are supplied in degrees or
//! radians; detector planes are in pixels. The gnomonic maps always work
//! in radians internally and convert back on output.

use std::f64::consts::PI;

/// Arcseconds per radian.
pub const ARCSEC_PER_RAD: f64 = 180.0 * 3600.0 / PI;

/// Unit convention of a set of input coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    /// Angles in degrees.
    #[default]
    Degrees,
    /// Angles in radians.
    Radians,
    /// Detector pixels (no angular meaning).
    Pixels,
}

impl Units {
    /// Multiplicative factor taking a value in these units to radians.
    ///
    /// Pixels have no angular scale and pass through unchanged.
    pub fn to_radians(self) -> f64 {
        match self {
            Units::Degrees => PI / 180.0,
            Units::Radians | Units::Pixels => 1.0,
        }
    }

    /// Size of one arcsecond expressed in these units.
    ///
    /// For pixels a "one arcsecond" nudge is taken to be one pixel.
    pub fn arcsec(self) -> f64 {
        match self {
            Units::Degrees => 1.0 / 3600.0,
            Units::Radians => 1.0 / ARCSEC_PER_RAD,
            Units::Pixels => 1.0,
        }
    }

    /// Returns `true` for degree or radian conventions.
    pub fn is_angular(self) -> bool {
        !matches!(self, Units::Pixels)
    }
}
