//! Chassis velocity commands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Isometry2, Vector2};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

// Internal
use super::{pose_exp, pose_log, Twist2};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity of the robot body relative to the ground.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChassisSpeeds {
    /// Forward velocity.
    ///
    /// Units: meters/second,
    /// Frame: Robot body
    pub vx_ms: f64,

    /// Leftward velocity.
    ///
    /// Units: meters/second,
    /// Frame: Robot body
    pub vy_ms: f64,

    /// Angular velocity, positive anticlockwise.
    ///
    /// Units: radians/second
    pub omega_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisSpeeds {
    pub fn new(vx_ms: f64, vy_ms: f64, omega_rads: f64) -> Self {
        Self {
            vx_ms,
            vy_ms,
            omega_rads,
        }
    }

    /// Return true if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.vx_ms.is_finite() && self.vy_ms.is_finite() && self.omega_rads.is_finite()
    }

    /// Convert the speeds into the twist travelled over `dt_s` seconds.
    pub fn to_twist(&self, dt_s: f64) -> Twist2 {
        Twist2 {
            dx_m: self.vx_ms * dt_s,
            dy_m: self.vy_ms * dt_s,
            dtheta_rad: self.omega_rads * dt_s,
        }
    }

    /// Build the speeds which travel along `twist` in `dt_s` seconds.
    pub fn from_twist(twist: &Twist2, dt_s: f64) -> Self {
        Self {
            vx_ms: twist.dx_m / dt_s,
            vy_ms: twist.dy_m / dt_s,
            omega_rads: twist.dtheta_rad / dt_s,
        }
    }

    /// Discretize continuous speeds over one control period.
    ///
    /// Holding the speeds constant over `dt_s` moves the robot along an arc,
    /// so it does not end where integrating the continuous command would put
    /// it. The returned speeds, when held for `dt_s`, place the robot exactly
    /// at the pose `(vx_ms * dt_s, vy_ms * dt_s, omega_rads * dt_s)`.
    ///
    /// `dt_s` must be positive.
    pub fn discretize(&self, dt_s: f64) -> Self {
        let desired_delta = Isometry2::new(
            Vector2::new(self.vx_ms * dt_s, self.vy_ms * dt_s),
            self.omega_rads * dt_s,
        );

        Self::from_twist(&pose_log(&desired_delta), dt_s)
    }

    /// The pose reached by holding these speeds for `dt_s` seconds.
    pub fn integrate(&self, dt_s: f64) -> Isometry2<f64> {
        pose_exp(&self.to_twist(dt_s))
    }
}

impl Mul<f64> for ChassisSpeeds {
    type Output = ChassisSpeeds;

    fn mul(self, scale: f64) -> Self::Output {
        Self {
            vx_ms: self.vx_ms * scale,
            vy_ms: self.vy_ms * scale,
            omega_rads: self.omega_rads * scale,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_discretize_reaches_target() {
        let target = ChassisSpeeds::new(1.0, 0.0, 0.5);
        let duration_s = 1.0;
        let dt_s = 0.01;

        let speeds = target.discretize(duration_s);
        let twist = speeds.to_twist(dt_s);

        // Hold the discretized speeds over the whole duration in small steps
        let mut pose = Isometry2::identity();
        let num_steps = (duration_s / dt_s).round() as usize;
        for _ in 0..num_steps {
            pose *= pose_exp(&twist);
        }

        assert!((pose.translation.x - target.vx_ms * duration_s).abs() < EPS);
        assert!((pose.translation.y - target.vy_ms * duration_s).abs() < EPS);
        assert!((pose.rotation.angle() - target.omega_rads * duration_s).abs() < EPS);
    }

    #[test]
    fn test_discretize_no_rotation() {
        // Without rotation there is no coupling and the speeds are unchanged
        let speeds = ChassisSpeeds::new(2.0, -1.0, 0.0);
        let disc = speeds.discretize(0.02);

        assert!((disc.vx_ms - 2.0).abs() < EPS);
        assert!((disc.vy_ms + 1.0).abs() < EPS);
        assert!(disc.omega_rads.abs() < EPS);
    }

    #[test]
    fn test_integrate_undoes_discretize() {
        let speeds = ChassisSpeeds::new(0.5, -0.5, 0.5);
        let dt_s = 0.02;

        let pose = speeds.discretize(dt_s).integrate(dt_s);

        assert!((pose.translation.x - 0.5 * dt_s).abs() < EPS);
        assert!((pose.translation.y + 0.5 * dt_s).abs() < EPS);
        assert!((pose.rotation.angle() - 0.5 * dt_s).abs() < EPS);
    }

    #[test]
    fn test_mul() {
        let speeds = ChassisSpeeds::new(1.0, -2.0, 3.0) * 0.5;

        assert_eq!(speeds, ChassisSpeeds::new(0.5, -1.0, 1.5));
    }
}
