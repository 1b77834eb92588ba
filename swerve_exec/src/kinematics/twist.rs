//! Twists and the SE(2) exponential/logarithm maps

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Isometry2, Vector2};
use serde::{Deserialize, Serialize};

// Internal
use super::SMALL_ANGLE_TOL;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A displacement along a constant curvature arc, expressed in the frame of
/// the pose at the start of the arc.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Twist2 {
    /// Forward displacement.
    ///
    /// Units: meters,
    /// Frame: Robot body at the start of the arc
    pub dx_m: f64,

    /// Leftward displacement.
    ///
    /// Units: meters,
    /// Frame: Robot body at the start of the arc
    pub dy_m: f64,

    /// Change in heading, positive anticlockwise.
    ///
    /// Units: radians
    pub dtheta_rad: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a twist onto the pose reached by following it from the origin.
pub fn pose_exp(twist: &Twist2) -> Isometry2<f64> {
    let dtheta = twist.dtheta_rad;
    let (sin_theta, cos_theta) = dtheta.sin_cos();

    let (s, c) = if dtheta.abs() < SMALL_ANGLE_TOL {
        (1.0 - dtheta * dtheta / 6.0, 0.5 * dtheta)
    } else {
        (sin_theta / dtheta, (1.0 - cos_theta) / dtheta)
    };

    Isometry2::new(
        Vector2::new(
            twist.dx_m * s - twist.dy_m * c,
            twist.dx_m * c + twist.dy_m * s,
        ),
        dtheta,
    )
}

/// Find the twist which moves the origin onto the given pose.
///
/// The heading change of the returned twist lies in `(-pi, pi]`, so poses
/// differing by a full turn map onto the same twist.
pub fn pose_log(pose: &Isometry2<f64>) -> Twist2 {
    let dtheta = pose.rotation.angle();
    let half_dtheta = 0.5 * dtheta;
    let cos_minus_one = pose.rotation.cos_angle() - 1.0;

    let half_theta_by_tan_half_theta = if cos_minus_one.abs() < SMALL_ANGLE_TOL {
        1.0 - dtheta * dtheta / 12.0
    } else {
        -(half_dtheta * pose.rotation.sin_angle()) / cos_minus_one
    };

    let t = pose.translation.vector;

    Twist2 {
        dx_m: half_theta_by_tan_half_theta * t.x + half_dtheta * t.y,
        dy_m: -half_dtheta * t.x + half_theta_by_tan_half_theta * t.y,
        dtheta_rad: dtheta,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    const EPS: f64 = 1e-9;

    fn assert_twist_near(a: &Twist2, b: &Twist2) {
        assert!((a.dx_m - b.dx_m).abs() < EPS, "{:?} != {:?}", a, b);
        assert!((a.dy_m - b.dy_m).abs() < EPS, "{:?} != {:?}", a, b);
        assert!((a.dtheta_rad - b.dtheta_rad).abs() < EPS, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_exp_straight() {
        let pose = pose_exp(&Twist2 {
            dx_m: 5.0,
            dy_m: 0.0,
            dtheta_rad: 0.0,
        });

        assert!((pose.translation.x - 5.0).abs() < EPS);
        assert!(pose.translation.y.abs() < EPS);
        assert!(pose.rotation.angle().abs() < EPS);
    }

    #[test]
    fn test_exp_quarter_circle() {
        // Quarter circle of radius 1 to the left
        let pose = pose_exp(&Twist2 {
            dx_m: PI / 2.0,
            dy_m: 0.0,
            dtheta_rad: PI / 2.0,
        });

        assert!((pose.translation.x - 1.0).abs() < EPS);
        assert!((pose.translation.y - 1.0).abs() < EPS);
        assert!((pose.rotation.angle() - PI / 2.0).abs() < EPS);
    }

    #[test]
    fn test_log_inverts_exp() {
        let twists = [
            Twist2 {
                dx_m: 1.0,
                dy_m: -0.5,
                dtheta_rad: 0.3,
            },
            Twist2 {
                dx_m: -2.0,
                dy_m: 0.25,
                dtheta_rad: -2.5,
            },
            Twist2 {
                dx_m: 0.1,
                dy_m: 0.1,
                dtheta_rad: 1e-12,
            },
            Twist2 {
                dx_m: 0.0,
                dy_m: 0.0,
                dtheta_rad: 0.0,
            },
        ];

        for twist in twists.iter() {
            assert_twist_near(&pose_log(&pose_exp(twist)), twist);
        }
    }

    #[test]
    fn test_small_angle_continuity() {
        // Either side of the series threshold the maps should agree closely
        let below = pose_exp(&Twist2 {
            dx_m: 1.0,
            dy_m: 1.0,
            dtheta_rad: 0.5e-9,
        });
        let above = pose_exp(&Twist2 {
            dx_m: 1.0,
            dy_m: 1.0,
            dtheta_rad: 2e-9,
        });

        assert!((below.translation.vector - above.translation.vector).norm() < EPS);

        let below = pose_log(&Isometry2::new(Vector2::new(1.0, -1.0), 1e-5));
        let above = pose_log(&Isometry2::new(Vector2::new(1.0, -1.0), 1e-3));

        assert!((below.dx_m - above.dx_m).abs() < 1e-3);
        assert!((below.dy_m - above.dy_m).abs() < 1e-3);
    }
}
