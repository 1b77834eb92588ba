//! Implementations for the SwerveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use serde::Serialize;

// Internal
use super::{DriveCmd, Params, SwerveCtrlError};
use crate::desat::{desaturated_discretize_with_limits, DesatOutput};
use crate::kinematics::ChassisSpeeds;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Swerve control module state
#[derive(Default)]
pub struct SwerveCtrl {
    pub(crate) params: Params,

    /// Script or session time of the current cycle.
    ///
    /// Units: seconds
    time_s: f64,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) current_cmd: Option<DriveCmd>,
    arch_current_cmd: Archiver,

    pub(crate) output: OutputData,
    arch_output: Archiver,
}

/// Input data to swerve control.
#[derive(Default, Debug, Clone, Copy)]
pub struct InputData {
    /// Time of this cycle.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// The command to be executed, or `None` if there is no new command on
    /// this cycle.
    pub cmd: Option<DriveCmd>,
}

/// Output demand from SwerveCtrl, to be held for one cycle.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct OutputData {
    /// Discretized chassis speeds for this cycle.
    pub speeds: ChassisSpeeds,
}

/// Status report for SwerveCtrl processing.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Scale applied to the commanded speeds, 1 when unlimited.
    pub scale: f64,

    /// True if the command was scaled down to respect the module speed
    /// limit.
    pub saturated: bool,

    pub num_restrictions: usize,
    pub num_error_evals: usize,
    pub root_iters_exhausted: bool,
    pub restrictions_exhausted: bool,
}

/// Archive record of the current command.
#[derive(Serialize)]
struct CmdRecord {
    time_s: f64,
    cmd_type: &'static str,
    vx_ms: f64,
    vy_ms: f64,
    omega_rads: f64,
}

/// Archive record of the output.
#[derive(Serialize)]
struct OutputRecord {
    time_s: f64,
    vx_ms: f64,
    vy_ms: f64,
    omega_rads: f64,
}

/// Archive record of the status report.
#[derive(Serialize)]
struct ReportRecord {
    time_s: f64,
    scale: f64,
    saturated: bool,
    num_restrictions: usize,
    num_error_evals: usize,
    root_iters_exhausted: bool,
    restrictions_exhausted: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for StatusReport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            saturated: false,
            num_restrictions: 0,
            num_error_evals: 0,
            root_iters_exhausted: false,
            restrictions_exhausted: false,
        }
    }
}

impl From<&DesatOutput> for StatusReport {
    fn from(desat: &DesatOutput) -> Self {
        Self {
            scale: desat.scale,
            saturated: desat.scale < 1.0,
            num_restrictions: desat.report.num_restrictions,
            num_error_evals: desat.report.num_error_evals,
            root_iters_exhausted: desat.report.root_iters_exhausted,
            restrictions_exhausted: desat.report.restrictions_exhausted,
        }
    }
}

impl State for SwerveCtrl {
    type InitData = &'static str;
    type InitError = SwerveCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = SwerveCtrlError;

    /// Initialise the SwerveCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        // Load the parameters
        let params: Params = params::load(init_data).map_err(SwerveCtrlError::ParamLoad)?;
        params.validate()?;
        self.params = params;

        // Create the arch folder for swerve_ctrl
        let arch_path = session.arch_root.join("swerve_ctrl");
        std::fs::create_dir_all(arch_path)
            .map_err(|e| SwerveCtrlError::ArchiveInit(ArchiveError::FileError(e)))?;

        // Initialise the archivers
        self.arch_report = Archiver::from_path(session, "swerve_ctrl/status_report.csv")
            .map_err(SwerveCtrlError::ArchiveInit)?;
        self.arch_current_cmd = Archiver::from_path(session, "swerve_ctrl/current_cmd.csv")
            .map_err(SwerveCtrlError::ArchiveInit)?;
        self.arch_output = Archiver::from_path(session, "swerve_ctrl/output.csv")
            .map_err(SwerveCtrlError::ArchiveInit)?;

        Ok(())
    }

    /// Perform cyclic processing of swerve control.
    ///
    /// If the current command cannot be desaturated the module is made safe
    /// and the error returned, so the following cycles output a stop.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();
        self.time_s = input_data.time_s;

        // Check to see if there's a new command
        if let Some(cmd) = input_data.cmd {
            debug!("New DriveCmd: {:?}", cmd);
            self.current_cmd = Some(cmd);
        }

        let output = match self.current_cmd {
            Some(cmd @ DriveCmd::Velocity { .. }) => {
                let desat = match desaturated_discretize_with_limits(
                    cmd.target_speeds(),
                    self.params.cycle_period_s,
                    self.params.max_module_speed_ms,
                    &self.params.module_positions(),
                    &self.params.desat_limits,
                ) {
                    Ok(d) => d,
                    Err(e) => {
                        self.make_safe();
                        return Err(SwerveCtrlError::Desat(e));
                    }
                };

                self.report = StatusReport::from(&desat);

                if self.report.saturated {
                    trace!("DriveCmd scaled by {:.6}", desat.scale);
                }
                if desat.report.root_iters_exhausted || desat.report.restrictions_exhausted {
                    warn!("Desaturation did not converge, using conservative scale {}", desat.scale);
                }

                OutputData {
                    speeds: desat.speeds,
                }
            }
            // Stop shall never error and always bring the robot to rest
            Some(DriveCmd::Stop) | None => OutputData::default(),
        };

        trace!("SwerveCtrl output: {:?}", output.speeds);

        self.output = output;

        Ok((output, self.report))
    }

    /// Replace the current command with a stop, so the next cycle outputs zero speeds.
    fn make_safe(&mut self) {
        self.current_cmd = Some(DriveCmd::Stop);
        self.output = OutputData::default();
    }
}

impl Archived for SwerveCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let (cmd_type, cmd_speeds) = match self.current_cmd {
            Some(c) => (c.type_name(), c.target_speeds()),
            None => ("None", ChassisSpeeds::default()),
        };

        self.arch_current_cmd.serialise(CmdRecord {
            time_s: self.time_s,
            cmd_type,
            vx_ms: cmd_speeds.vx_ms,
            vy_ms: cmd_speeds.vy_ms,
            omega_rads: cmd_speeds.omega_rads,
        })?;

        self.arch_output.serialise(OutputRecord {
            time_s: self.time_s,
            vx_ms: self.output.speeds.vx_ms,
            vy_ms: self.output.speeds.vy_ms,
            omega_rads: self.output.speeds.omega_rads,
        })?;

        self.arch_report.serialise(ReportRecord {
            time_s: self.time_s,
            scale: self.report.scale,
            saturated: self.report.saturated,
            num_restrictions: self.report.num_restrictions,
            num_error_evals: self.report.num_error_evals,
            root_iters_exhausted: self.report.root_iters_exhausted,
            restrictions_exhausted: self.report.restrictions_exhausted,
        })?;

        Ok(())
    }
}

impl SwerveCtrl {
    /// Create a new module from parameters, without archiving.
    pub fn new(params: Params) -> Result<Self, SwerveCtrlError> {
        params.validate()?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// Get the parameters in use.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::desat::DesatLimits;

    fn test_params() -> Params {
        Params {
            module_pos_m_rb: [[0.3, 0.3], [0.3, -0.3], [-0.3, 0.3], [-0.3, -0.3]],
            max_module_speed_ms: 4.5,
            cycle_period_s: 0.02,
            desat_limits: DesatLimits::default(),
        }
    }

    fn velocity(vx_ms: f64, vy_ms: f64, omega_rads: f64) -> Option<DriveCmd> {
        Some(DriveCmd::Velocity {
            vx_ms,
            vy_ms,
            omega_rads,
        })
    }

    #[test]
    fn test_no_cmd() {
        let mut ctrl = SwerveCtrl::new(test_params()).unwrap();

        let (out, rpt) = ctrl.proc(&InputData::default()).unwrap();

        assert_eq!(out, OutputData::default());
        assert_eq!(rpt, StatusReport::default());
    }

    #[test]
    fn test_unsaturated_velocity() {
        let mut ctrl = SwerveCtrl::new(test_params()).unwrap();

        let (out, rpt) = ctrl
            .proc(&InputData {
                time_s: 0.0,
                cmd: velocity(1.0, 0.5, 1.0),
            })
            .unwrap();

        assert_eq!(out.speeds, ChassisSpeeds::new(1.0, 0.5, 1.0).discretize(0.02));
        assert_eq!(rpt.scale, 1.0);
        assert!(!rpt.saturated);
    }

    #[test]
    fn test_saturated_velocity_held() {
        let mut ctrl = SwerveCtrl::new(test_params()).unwrap();

        let (first, rpt) = ctrl
            .proc(&InputData {
                time_s: 0.0,
                cmd: velocity(6.0, 0.0, 4.0),
            })
            .unwrap();

        assert!(rpt.saturated);
        assert!(rpt.scale < 1.0);
        assert!(rpt.num_restrictions >= 1);

        // Without a new command the last one is held
        let (second, _) = ctrl
            .proc(&InputData {
                time_s: 0.02,
                cmd: None,
            })
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_stop() {
        let mut ctrl = SwerveCtrl::new(test_params()).unwrap();

        ctrl.proc(&InputData {
            time_s: 0.0,
            cmd: velocity(1.0, 0.0, 0.0),
        })
        .unwrap();

        let (out, _) = ctrl
            .proc(&InputData {
                time_s: 0.02,
                cmd: Some(DriveCmd::Stop),
            })
            .unwrap();

        assert_eq!(out.speeds, ChassisSpeeds::default());
    }

    #[test]
    fn test_make_safe() {
        let mut ctrl = SwerveCtrl::new(test_params()).unwrap();

        ctrl.proc(&InputData {
            time_s: 0.0,
            cmd: velocity(1.0, 0.0, 0.0),
        })
        .unwrap();

        ctrl.make_safe();

        let (out, _) = ctrl.proc(&InputData::default()).unwrap();

        assert_eq!(out.speeds, ChassisSpeeds::default());
        assert_eq!(ctrl.current_cmd, Some(DriveCmd::Stop));
    }

    #[test]
    fn test_invalid_cmd_stops() {
        let mut ctrl = SwerveCtrl::new(test_params()).unwrap();

        let r = ctrl.proc(&InputData {
            time_s: 0.0,
            cmd: velocity(f64::NAN, 0.0, 0.0),
        });

        assert!(matches!(r, Err(SwerveCtrlError::Desat(_))));

        let (out, _) = ctrl.proc(&InputData::default()).unwrap();
        assert_eq!(out.speeds, ChassisSpeeds::default());
    }

    #[test]
    fn test_invalid_params() {
        let mut params = test_params();
        params.cycle_period_s = -1.0;

        assert!(matches!(
            SwerveCtrl::new(params),
            Err(SwerveCtrlError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_write_without_init() {
        let mut ctrl = SwerveCtrl::new(test_params()).unwrap();

        assert!(matches!(ctrl.write(), Err(ArchiveError::NotInitialised)));
    }
}
