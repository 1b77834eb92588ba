//! Main swerve drive executable entry point.
//!
//! # Architecture
//!
//! The executable replays a command script through the swerve control
//! module in real time:
//!
//!     - Initialise the session, logging and modules
//!     - Main loop:
//!         - Command acquisition from the script
//!         - Swerve control processing
//!         - Archiving
//!         - Pose estimate update
//!         - Cycle timing
//!
//! # Usage
//!
//! ```text
//! swerve_exec <script_path>
//! ```
//!
//! The `SWERVE_SW_ROOT` environment variable must point at the directory
//! holding `params/` and `sessions/`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, error, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use swerve_lib::{
    data_store::{DataStore, SafeModeCause},
    swerve_ctrl::DriveCmd,
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingCmds, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive cycle overruns after which a warning is raised for
/// every further overrun.
const MAX_CONSEC_CYCLE_OVERRUNS: u64 = 5;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("swerve_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Swerve Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD SCRIPT ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() != 2 {
        return Err(eyre!(
            "Expected one argument (the script path), found {}",
            args.len().saturating_sub(1)
        ));
    }

    info!("Loading script from \"{}\"", &args[1]);

    let mut script: ScriptInterpreter<DriveCmd> =
        ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} commands\n",
        script.get_duration(),
        script.get_num_cmds()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.swerve_ctrl
        .init("swerve_ctrl.toml", &session)
        .wrap_err("Failed to initialise SwerveCtrl")?;
    info!("SwerveCtrl init complete");

    info!("Module initialisation complete\n");

    let cycle_period_s = ds.swerve_ctrl.params().cycle_period_s;
    let cycle_period = Duration::from_secs_f64(cycle_period_s);

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(cycle_period_s);

        // ---- COMMAND PROCESSING ----

        match script.get_pending(ds.sim_time_s) {
            PendingCmds::None => (),
            PendingCmds::Some(cmds) => {
                for cmd in cmds {
                    ds.set_cmd(cmd);
                }
            }
            PendingCmds::EndOfScript => {
                info!("End of script reached, stopping");
                break;
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        match ds.swerve_ctrl.proc(&ds.swerve_ctrl_input) {
            Ok((o, r)) => {
                ds.swerve_ctrl_output = o;
                ds.swerve_ctrl_status_rpt = r;
                ds.record_swerve_ctrl_result(true);
            }
            Err(e) => {
                // SwerveCtrl stops on errors, continue with the zeroed output
                warn!("Error during SwerveCtrl processing: {}", e);
                ds.record_swerve_ctrl_result(false);
            }
        };

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.swerve_ctrl.write() {
            if !ds.safe {
                error!("Could not write SwerveCtrl archives: {}", e);
            }
            ds.make_safe(SafeModeCause::ArchiveWriteError);
        }

        ds.cycle_end(cycle_period_s);

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                ds.num_consec_cycle_overruns += 1;

                if ds.num_consec_cycle_overruns >= MAX_CONSEC_CYCLE_OVERRUNS {
                    warn!(
                        "Cycle overran by {:.06} s ({} consecutive overruns)",
                        (cycle_dur - cycle_period).as_secs_f64(),
                        ds.num_consec_cycle_overruns
                    );
                }
            }
        }
    }

    // ---- SHUTDOWN ----

    info!(
        "Final pose estimate: x = {:.3} m, y = {:.3} m, heading = {:.3} rad",
        ds.pose_est.translation.x,
        ds.pose_est.translation.y,
        ds.pose_est.rotation.angle()
    );
    info!(
        "{} of {} cycles were saturated",
        ds.num_saturated_cycles, ds.num_cycles
    );
    if let Some(cause) = ds.safe_cause {
        warn!("Execution ended in safe mode, cause: {:?}", cause);
    }
    info!("End of execution");

    Ok(())
}
