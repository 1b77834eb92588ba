//! Parameters structure for SwerveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Deserialize;

use super::{SwerveCtrlError, NUM_MODULES};
use crate::desat::DesatLimits;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for swerve control.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// The position of each module's steer axis in the robot body frame.
    ///
    /// Units: meters,
    /// Frame: Robot body
    pub module_pos_m_rb: [[f64; 2]; NUM_MODULES],

    // ---- CAPABILITIES ----
    /// Maximum ground speed of any module.
    ///
    /// Units: meters/second
    pub max_module_speed_ms: f64,

    // ---- TIMING ----
    /// Period over which each output is held.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    // ---- SOLVER LIMITS ----
    /// Iteration limits of the desaturation, defaulted if not given.
    #[serde(default)]
    pub desat_limits: DesatLimits,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// The module positions as vectors.
    pub fn module_positions(&self) -> [Vector2<f64>; NUM_MODULES] {
        self.module_pos_m_rb.map(|p| Vector2::new(p[0], p[1]))
    }

    /// Check the parameters can be used for control.
    pub fn validate(&self) -> Result<(), SwerveCtrlError> {
        if !(self.cycle_period_s > 0.0 && self.cycle_period_s.is_finite()) {
            return Err(SwerveCtrlError::InvalidParams(format!(
                "cycle_period_s must be positive and finite, found {}",
                self.cycle_period_s
            )));
        }

        if !(self.max_module_speed_ms >= 0.0 && self.max_module_speed_ms.is_finite()) {
            return Err(SwerveCtrlError::InvalidParams(format!(
                "max_module_speed_ms must be non-negative and finite, found {}",
                self.max_module_speed_ms
            )));
        }

        for (i, p) in self.module_pos_m_rb.iter().enumerate() {
            if !p.iter().all(|c| c.is_finite()) {
                return Err(SwerveCtrlError::InvalidParams(format!(
                    "module_pos_m_rb[{}] is not finite",
                    i
                )));
            }
        }

        Ok(())
    }
}
