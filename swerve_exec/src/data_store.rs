//! # Data Store

use log::{debug, error, warn};
use nalgebra::Isometry2;

use crate::swerve_ctrl;
use util::module::State;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive SwerveCtrl processing errors tolerated before safe mode is entered.
pub const MAX_SWERVE_CTRL_ERROR_LIMIT: u64 = 5;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gives the reason the robot has been put into safe mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafeModeCause {
    /// SwerveCtrl failed to process more than `MAX_SWERVE_CTRL_ERROR_LIMIT` cycles in a row
    SwerveCtrlErrorLimit,

    /// The SwerveCtrl archives could not be written
    ArchiveWriteError,
}

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Script elapsed time at the start of this cycle
    ///
    /// Units: seconds
    pub sim_time_s: f64,

    /// Determines if the robot is in safe mode.
    pub safe: bool,

    /// Gives the reason for the robot being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // SwerveCtrl
    pub swerve_ctrl: swerve_ctrl::SwerveCtrl,
    pub swerve_ctrl_input: swerve_ctrl::InputData,
    pub swerve_ctrl_output: swerve_ctrl::OutputData,
    pub swerve_ctrl_status_rpt: swerve_ctrl::StatusReport,

    /// Pose estimated by holding each cycle's output for one period.
    ///
    /// Frame: Start pose of the robot
    pub pose_est: Isometry2<f64>,

    // Monitoring Counters
    /// Number of cycles in which the command was scaled down
    pub num_saturated_cycles: u64,

    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive cycles in which SwerveCtrl returned an error
    pub num_consec_swerve_ctrl_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Default for DataStore {
    fn default() -> Self {
        Self {
            num_cycles: 0,
            sim_time_s: 0.0,
            safe: false,
            safe_cause: None,
            swerve_ctrl: swerve_ctrl::SwerveCtrl::default(),
            swerve_ctrl_input: swerve_ctrl::InputData::default(),
            swerve_ctrl_output: swerve_ctrl::OutputData::default(),
            swerve_ctrl_status_rpt: swerve_ctrl::StatusReport::default(),
            pose_est: Isometry2::identity(),
            num_saturated_cycles: 0,
            num_consec_cycle_overruns: 0,
            num_consec_swerve_ctrl_errors: 0,
        }
    }
}

impl DataStore {
    /// Puts the robot into safe mode with the given cause, stopping it.
    ///
    /// Safe mode latches for the rest of the execution.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            self.swerve_ctrl.make_safe();
        }
    }

    /// Queue a script command for SwerveCtrl this cycle.
    ///
    /// Only the latest command of a cycle is executed. Commands are dropped while in safe mode.
    pub fn set_cmd(&mut self, cmd: swerve_ctrl::DriveCmd) {
        if self.safe {
            debug!("Command {:?} dropped, robot is in safe mode", cmd);
            return;
        }

        if let Some(skipped) = self.swerve_ctrl_input.cmd.replace(cmd) {
            debug!("Command {:?} superseded in the same cycle", skipped);
        }
    }

    /// Track the result of this cycle's SwerveCtrl processing, entering safe mode once too many
    /// cycles in a row have failed.
    pub fn record_swerve_ctrl_result(&mut self, ok: bool) {
        if ok {
            self.num_consec_swerve_ctrl_errors = 0;
            return;
        }

        self.num_consec_swerve_ctrl_errors += 1;

        if self.num_consec_swerve_ctrl_errors > MAX_SWERVE_CTRL_ERROR_LIMIT {
            if !self.safe {
                error!(
                    "Maximum number of consecutive SwerveCtrl errors ({}) has been exceeded",
                    MAX_SWERVE_CTRL_ERROR_LIMIT
                );
            }
            self.make_safe(SafeModeCause::SwerveCtrlErrorLimit);
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the script time.
    pub fn cycle_start(&mut self, cycle_period_s: f64) {
        self.swerve_ctrl_input = swerve_ctrl::InputData::default();
        self.swerve_ctrl_output = swerve_ctrl::OutputData::default();
        self.swerve_ctrl_status_rpt = swerve_ctrl::StatusReport::default();

        self.sim_time_s = self.num_cycles as f64 * cycle_period_s;
        self.swerve_ctrl_input.time_s = self.sim_time_s;
    }

    /// Perform actions required at the end of a cycle.
    ///
    /// Moves the pose estimate along this cycle's output and updates the counters.
    pub fn cycle_end(&mut self, cycle_period_s: f64) {
        self.pose_est *= self.swerve_ctrl_output.speeds.integrate(cycle_period_s);

        if self.swerve_ctrl_status_rpt.saturated {
            self.num_saturated_cycles += 1;
        }

        self.num_cycles += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kinematics::ChassisSpeeds;

    #[test]
    fn test_cycle_time() {
        let mut ds = DataStore::default();

        for _ in 0..10 {
            ds.cycle_start(0.02);
            ds.cycle_end(0.02);
        }
        ds.cycle_start(0.02);

        assert!((ds.sim_time_s - 0.2).abs() < 1e-12);
        assert_eq!(ds.swerve_ctrl_input.time_s, ds.sim_time_s);
    }

    #[test]
    fn test_pose_integration() {
        let mut ds = DataStore::default();

        // Quarter turn while driving forwards
        let omega_rads = std::f64::consts::FRAC_PI_2;
        let cmd = ChassisSpeeds::new(1.0, 0.0, omega_rads);
        for _ in 0..50 {
            ds.cycle_start(0.02);
            ds.swerve_ctrl_output.speeds = cmd.discretize(0.02);
            ds.cycle_end(0.02);
        }

        // The discretized command reaches (v dt, 0, omega dt) each cycle, so
        // the robot moves along chords of the circle
        let (mut x_m, mut y_m) = (0.0, 0.0);
        for k in 0..50 {
            let heading_rad = k as f64 * omega_rads * 0.02;
            x_m += 0.02 * heading_rad.cos();
            y_m += 0.02 * heading_rad.sin();
        }

        assert!((ds.pose_est.rotation.angle() - omega_rads).abs() < 1e-9);
        assert!((ds.pose_est.translation.x - x_m).abs() < 1e-9);
        assert!((ds.pose_est.translation.y - y_m).abs() < 1e-9);
    }

    #[test]
    fn test_make_safe() {
        let mut ds = DataStore::default();

        ds.make_safe(SafeModeCause::ArchiveWriteError);
        ds.make_safe(SafeModeCause::SwerveCtrlErrorLimit);

        assert!(ds.safe);
        // First cause is kept
        assert_eq!(ds.safe_cause, Some(SafeModeCause::ArchiveWriteError));
        assert_eq!(ds.swerve_ctrl.current_cmd, Some(swerve_ctrl::DriveCmd::Stop));
    }

    #[test]
    fn test_swerve_ctrl_error_limit() {
        let mut ds = DataStore::default();

        // Intermittent errors never accumulate
        for _ in 0..(3 * MAX_SWERVE_CTRL_ERROR_LIMIT) {
            ds.record_swerve_ctrl_result(false);
            ds.record_swerve_ctrl_result(true);
        }
        assert!(!ds.safe);
        assert_eq!(ds.num_consec_swerve_ctrl_errors, 0);

        for _ in 0..MAX_SWERVE_CTRL_ERROR_LIMIT {
            ds.record_swerve_ctrl_result(false);
        }
        assert!(!ds.safe);

        ds.record_swerve_ctrl_result(false);
        assert!(ds.safe);
        assert_eq!(ds.safe_cause, Some(SafeModeCause::SwerveCtrlErrorLimit));
        assert_eq!(ds.swerve_ctrl.current_cmd, Some(swerve_ctrl::DriveCmd::Stop));
    }

    #[test]
    fn test_set_cmd() {
        let mut ds = DataStore::default();
        let fwd = swerve_ctrl::DriveCmd::Velocity {
            vx_ms: 1.0,
            vy_ms: 0.0,
            omega_rads: 0.0,
        };

        ds.cycle_start(0.02);
        ds.set_cmd(swerve_ctrl::DriveCmd::Stop);
        ds.set_cmd(fwd);
        assert_eq!(ds.swerve_ctrl_input.cmd, Some(fwd));

        // Safe mode drops script commands
        ds.make_safe(SafeModeCause::ArchiveWriteError);
        ds.cycle_start(0.02);
        ds.set_cmd(fwd);
        assert_eq!(ds.swerve_ctrl_input.cmd, None);
    }
}
