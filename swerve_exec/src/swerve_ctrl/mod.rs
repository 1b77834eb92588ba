//! Swerve control module
//!
//! Turns velocity commands into per-cycle chassis demands which respect the
//! module speed limit.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use params::*;
pub use state::*;

use crate::desat::DesatError;
use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of swerve modules on the robot.
pub const NUM_MODULES: usize = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during SwerveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SwerveCtrlError {
    #[error("Could not load the SwerveCtrl parameters: {0}")]
    ParamLoad(LoadError),

    #[error("Invalid SwerveCtrl parameters: {0}")]
    InvalidParams(String),

    #[error("Could not initialise the SwerveCtrl archives: {0}")]
    ArchiveInit(ArchiveError),

    #[error("Could not desaturate the drive command: {0}")]
    Desat(DesatError),
}
