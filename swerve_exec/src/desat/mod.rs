//! # Desaturated discretization
//!
//! Discretizes a continuous chassis command over one control period while
//! keeping every drive module within its speed limit.
//!
//! Naively scaling module speeds down after inverse kinematics distorts the
//! commanded motion, and scaling the continuous command before
//! discretization is not enough either, since discretizing rotates the
//! translational velocity by an amount which depends on the command's own
//! magnitude. Instead this module searches for the largest uniform scale `k`
//! in `[0, 1]` such that discretizing `k` times the command leaves every
//! module at or below the limit, and returns that discretized command.
//!
//! The search is split into:
//!
//! - `error_fn`: the squared speed excess of a module as a function of `k`,
//! - `root_solver`: finds where one module's excess crosses zero,
//! - `coordinator`: scans the modules until one clean lap is made.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod coordinator;
mod error_fn;
mod root_solver;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use crate::kinematics::ChassisSpeeds;
pub use error_fn::SaturationModel;
pub use root_solver::{find_root, RootResult};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Values with a magnitude below this are treated as zero.
pub const ZERO_TOL: f64 = 1e-9;

/// Offset below the current bound at which the secant search takes its
/// second point.
pub const SECANT_START_OFFSET: f64 = 1e-9;

/// Smallest fraction of the current scale a single secant step may reach.
pub const MIN_STEP_FRACTION: f64 = 0.5;

/// Default iteration limit for a single root search.
pub const DEFAULT_MAX_ROOT_ITERS: usize = 256;

/// Default limit on the number of scale restrictions in one call.
pub const DEFAULT_MAX_RESTRICTIONS: usize = 64;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Limits bounding the time spent in one desaturation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DesatLimits {
    /// Maximum number of iterations in one module's root search.
    pub max_root_iters: usize,

    /// Maximum number of times the scale may be restricted.
    pub max_restrictions: usize,
}

/// Diagnostics from one desaturation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DesatReport {
    /// Number of times a module restricted the scale.
    pub num_restrictions: usize,

    /// Number of evaluations of the saturation error.
    pub num_error_evals: usize,

    /// A root search hit its iteration limit, and a conservative scale was
    /// used for it.
    pub root_iters_exhausted: bool,

    /// The restriction limit was hit and the command was stopped.
    pub restrictions_exhausted: bool,
}

/// Result of a desaturated discretization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DesatOutput {
    /// The discretized, desaturated command.
    pub speeds: ChassisSpeeds,

    /// The scale applied to the continuous command, in `[0, 1]`.
    pub scale: f64,

    pub report: DesatReport,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Invalid inputs to the desaturation.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum DesatError {
    #[error("Expected a positive finite period, found {0} s")]
    NonPositivePeriod(f64),

    #[error("Expected a non-negative module speed limit, found {0} m/s")]
    NegativeSpeedLimit(f64),

    #[error("At least one module is required")]
    NoModules,

    #[error("The command contains non-finite values: {0:?}")]
    NonFiniteCmd(ChassisSpeeds),

    #[error("The position of module {0} is not finite")]
    NonFiniteModulePos(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DesatLimits {
    fn default() -> Self {
        Self {
            max_root_iters: DEFAULT_MAX_ROOT_ITERS,
            max_restrictions: DEFAULT_MAX_RESTRICTIONS,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Discretize a continuous command so that no module exceeds the speed limit.
///
/// # Inputs
/// - `continuous`: The continuous command.
/// - `dt_s`: The period the command is held for.
/// - `max_module_speed_ms`: Speed limit of every module.
/// - `modules_m_rb`: Module positions in the robot body frame.
///
/// # Outputs
/// - The discretized command, which is the discretization of the continuous
///   command scaled by the largest admissible factor in `[0, 1]`.
pub fn desaturated_discretize<const N: usize>(
    continuous: ChassisSpeeds,
    dt_s: f64,
    max_module_speed_ms: f64,
    modules_m_rb: &[Vector2<f64>; N],
) -> Result<ChassisSpeeds, DesatError> {
    desaturated_discretize_with_limits(
        continuous,
        dt_s,
        max_module_speed_ms,
        modules_m_rb,
        &DesatLimits::default(),
    )
    .map(|o| o.speeds)
}

/// As `desaturated_discretize` but with explicit iteration limits, returning
/// the applied scale and a report on the search.
pub fn desaturated_discretize_with_limits<const N: usize>(
    continuous: ChassisSpeeds,
    dt_s: f64,
    max_module_speed_ms: f64,
    modules_m_rb: &[Vector2<f64>; N],
    limits: &DesatLimits,
) -> Result<DesatOutput, DesatError> {
    check_inputs(&continuous, dt_s, max_module_speed_ms, modules_m_rb)?;

    let mut model = SaturationModel::new(&continuous, dt_s, max_module_speed_ms);
    let mut report = DesatReport::default();

    let scale = coordinator::find_max_scale(&mut model, modules_m_rb, limits, &mut report);
    report.num_error_evals = model.num_evals();

    trace!(
        "Desaturated scale {} after {} restrictions ({} evaluations)",
        scale,
        report.num_restrictions,
        report.num_error_evals
    );

    Ok(DesatOutput {
        speeds: (continuous * scale).discretize(dt_s),
        scale,
        report,
    })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_inputs<const N: usize>(
    continuous: &ChassisSpeeds,
    dt_s: f64,
    max_module_speed_ms: f64,
    modules_m_rb: &[Vector2<f64>; N],
) -> Result<(), DesatError> {
    if !(dt_s > 0.0 && dt_s.is_finite()) {
        return Err(DesatError::NonPositivePeriod(dt_s));
    }

    // An infinite limit is allowed and never saturates
    if !(max_module_speed_ms >= 0.0) {
        return Err(DesatError::NegativeSpeedLimit(max_module_speed_ms));
    }

    if N == 0 {
        return Err(DesatError::NoModules);
    }

    if !continuous.is_finite() {
        return Err(DesatError::NonFiniteCmd(*continuous));
    }

    if let Some(i) = modules_m_rb
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite()))
    {
        return Err(DesatError::NonFiniteModulePos(i));
    }

    Ok(())
}
