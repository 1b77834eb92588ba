//! Commands passed into SwerveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::kinematics::ChassisSpeeds;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command to be executed by SwerveCtrl.
///
/// Commands persist until replaced, so a velocity command is held over every
/// following cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DriveCmd {
    /// Stop - bring the robot to a full stop.
    Stop,

    /// Velocity - drive the chassis at a continuous velocity, scaled down if
    /// a module would exceed its speed limit.
    Velocity {
        /// Units: meters/second,
        /// Frame: Robot body
        vx_ms: f64,

        /// Units: meters/second,
        /// Frame: Robot body
        vy_ms: f64,

        /// Units: radians/second
        omega_rads: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCmd {
    /// The continuous chassis speeds demanded by this command.
    pub fn target_speeds(&self) -> ChassisSpeeds {
        match *self {
            DriveCmd::Stop => ChassisSpeeds::default(),
            DriveCmd::Velocity {
                vx_ms,
                vy_ms,
                omega_rads,
            } => ChassisSpeeds::new(vx_ms, vy_ms, omega_rads),
        }
    }

    /// Short name of the command type, used in archives.
    pub fn type_name(&self) -> &'static str {
        match self {
            DriveCmd::Stop => "Stop",
            DriveCmd::Velocity { .. } => "Velocity",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_json() {
        let cmd: DriveCmd = serde_json::from_str(
            r#"{"Velocity": {"vx_ms": 1.0, "vy_ms": -0.5, "omega_rads": 0.25}}"#,
        )
        .unwrap();

        assert_eq!(
            cmd,
            DriveCmd::Velocity {
                vx_ms: 1.0,
                vy_ms: -0.5,
                omega_rads: 0.25
            }
        );
        assert_eq!(cmd.target_speeds(), ChassisSpeeds::new(1.0, -0.5, 0.25));

        let cmd: DriveCmd = serde_json::from_str(r#""Stop""#).unwrap();

        assert_eq!(cmd, DriveCmd::Stop);
        assert_eq!(cmd.target_speeds(), ChassisSpeeds::default());
    }

    #[test]
    fn test_missing_field() {
        let r: Result<DriveCmd, _> =
            serde_json::from_str(r#"{"Velocity": {"vx_ms": 1.0, "vy_ms": -0.5}}"#);

        assert!(r.is_err());
    }

    #[test]
    fn test_example_script() {
        use util::script_interpreter::{PendingCmds, ScriptInterpreter};

        let mut si: ScriptInterpreter<DriveCmd> = ScriptInterpreter::from_script_str(
            include_str!("../../../scripts/figure_of_eight.script"),
        )
        .unwrap();

        assert_eq!(si.get_num_cmds(), 7);
        assert_eq!(si.get_duration(), 12.0);
        assert_eq!(
            si.get_pending(0.0),
            PendingCmds::Some(vec![DriveCmd::Velocity {
                vx_ms: 1.0,
                vy_ms: 0.0,
                omega_rads: 0.0
            }])
        );
    }
}
