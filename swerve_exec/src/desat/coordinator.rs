//! Cross-module coordination of the scale search
//!
//! The error of a module need not be monotonic in the scale, so a module
//! which was unsaturated at a larger scale may saturate again once another
//! module has restricted it. Modules are therefore visited in a circular
//! scan. Each saturated module restricts the global scale to its own root and
//! becomes the pivot, and the scan finishes once it arrives back at the pivot
//! having verified every other module at the final scale.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};
use nalgebra::Vector2;

// Internal
use super::{error_fn::SaturationModel, root_solver, DesatLimits, DesatReport, ZERO_TOL};
use util::maths::{clamp, is_zero};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State of a scan over the modules.
#[derive(Debug, Clone, Copy)]
struct ScanState {
    /// Largest scale not yet ruled out by any module.
    max_k: f64,

    /// The module which last restricted `max_k`, or the first module verified
    /// if none has. The scan ends on returning to it.
    pivot: Option<usize>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the largest scale in `[0, 1]` at which no module is saturated.
///
/// `modules` must not be empty. The restriction count and any exhausted
/// limits are recorded in `report`.
pub fn find_max_scale<const N: usize>(
    model: &mut SaturationModel,
    modules_m_rb: &[Vector2<f64>; N],
    limits: &DesatLimits,
    report: &mut DesatReport,
) -> f64 {
    let mut state = ScanState {
        max_k: 1.0,
        pivot: None,
    };
    let mut i = 0;

    while state.pivot != Some(i) {
        let module = &modules_m_rb[i];
        let y = model.error(module, state.max_k);

        if is_zero(y, ZERO_TOL) || y <= 0.0 {
            // Verified, only becomes the pivot if nothing restricted yet
            if state.pivot.is_none() {
                state.pivot = Some(i);
            }
        } else {
            if report.num_restrictions >= limits.max_restrictions {
                warn!(
                    "Scale restricted {} times without settling, falling back to zero",
                    report.num_restrictions
                );
                report.restrictions_exhausted = true;
                return 0.0;
            }

            let root = root_solver::find_root(
                |k| model.error(module, k),
                state.max_k,
                y,
                limits.max_root_iters,
            );

            if root.exhausted {
                report.root_iters_exhausted = true;
            }

            trace!(
                "Module {} restricted k from {} to {} in {} iterations",
                i,
                state.max_k,
                root.k,
                root.num_iters
            );

            state.max_k = clamp(root.k, 0.0, state.max_k);
            state.pivot = Some(i);
            report.num_restrictions += 1;
        }

        i = (i + 1) % modules_m_rb.len();
    }

    state.max_k
}
