//! Per-module saturation error function

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use super::ZERO_TOL;
use crate::kinematics::ChassisSpeeds;
use util::maths::is_zero;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Saturation model of the drive modules for one continuous command.
///
/// Gives, for a module at a given position, how far the squared speed of that
/// module exceeds the squared speed limit when the command is scaled by `k`
/// and discretized over one period.
#[derive(Debug, Clone)]
pub struct SaturationModel {
    cmd: ChassisSpeeds,

    /// Units: seconds
    dt_s: f64,

    /// Units: meters^2/second^2
    max_speed_sq: f64,

    /// Number of error evaluations performed so far.
    num_evals: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SaturationModel {
    pub fn new(cmd: &ChassisSpeeds, dt_s: f64, max_module_speed_ms: f64) -> Self {
        Self {
            cmd: *cmd,
            dt_s,
            max_speed_sq: max_module_speed_ms * max_module_speed_ms,
            num_evals: 0,
        }
    }

    /// Velocity of the module at `module_pos_m_rb` when `k` times the command
    /// is discretized and executed.
    ///
    /// Units: meters/second,
    /// Frame: Robot body
    pub fn module_velocity(&self, module_pos_m_rb: &Vector2<f64>, k: f64) -> Vector2<f64> {
        let half_dtheta = self.cmd.omega_rads * self.dt_s / 2.0 * k;

        // half_dtheta / tan(half_dtheta), by series close to zero
        let half_dtheta_by_tan = if !is_zero(half_dtheta, ZERO_TOL) {
            half_dtheta / half_dtheta.tan()
        } else {
            let half_dtheta_sq = half_dtheta * half_dtheta;
            1.0 - half_dtheta_sq / 3.0 - half_dtheta_sq * half_dtheta_sq / 45.0
        };

        let vx = k * self.cmd.vx_ms;
        let vy = k * self.cmd.vy_ms;

        let v_chassis = Vector2::new(
            half_dtheta_by_tan * vx + half_dtheta * vy,
            -half_dtheta * vx + half_dtheta_by_tan * vy,
        );
        let omega_chassis = k * self.cmd.omega_rads;

        Vector2::new(
            v_chassis.x - omega_chassis * module_pos_m_rb.y,
            v_chassis.y + omega_chassis * module_pos_m_rb.x,
        )
    }

    /// Saturation error of a module at scale `k`.
    ///
    /// Positive when the module would exceed the speed limit. Units:
    /// meters^2/second^2.
    pub fn error(&mut self, module_pos_m_rb: &Vector2<f64>, k: f64) -> f64 {
        self.num_evals += 1;

        self.module_velocity(module_pos_m_rb, k).norm_squared() - self.max_speed_sq
    }

    /// Number of error evaluations performed by this model.
    pub fn num_evals(&self) -> usize {
        self.num_evals
    }
}
