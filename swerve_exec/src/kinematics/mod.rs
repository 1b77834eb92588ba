//! Kinematics primitives
//!
//! Holds the chassis velocity command type and the SE(2) exponential and
//! logarithm maps used to discretize it over one control period.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod chassis_speeds;
mod twist;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use chassis_speeds::*;
pub use twist::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Below this magnitude an angle (or `cos(angle) - 1`) is treated as zero and
/// the series expansion of the exp/log maps is used instead.
pub const SMALL_ANGLE_TOL: f64 = 1e-9;
