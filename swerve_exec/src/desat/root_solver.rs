//! Scalar root solver for the saturation error of a single module
//!
//! The solver searches downward from a scale at which the module is
//! saturated. A secant iteration, with each step limited to halving the
//! scale, runs until the error is no longer positive. If that lands exactly
//! on the root the search is over, otherwise the last two secant points
//! bracket the root and regula falsi closes the bracket.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;

// Internal
use super::{MIN_STEP_FRACTION, SECANT_START_OFFSET, ZERO_TOL};
use util::maths::is_zero;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of a root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootResult {
    /// The scale found by the search.
    ///
    /// If the search was exhausted this is the largest scale known to be
    /// unsaturated rather than a root.
    pub k: f64,

    /// Number of iterations used across both phases.
    pub num_iters: usize,

    /// True if the iteration limit was reached before convergence.
    pub exhausted: bool,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the largest scale at or below `max_k` where `error` crosses zero.
///
/// `error_max_k` must be `error(max_k)`, and must be positive and not within
/// the zero tolerance.
///
/// At most `max_iters` steps are taken. If the secant phase runs out of
/// steps only zero is known to be safe and is returned, if regula falsi runs
/// out the negative end of its bracket is returned.
pub fn find_root<F>(mut error: F, max_k: f64, error_max_k: f64, max_iters: usize) -> RootResult
where
    F: FnMut(f64) -> f64,
{
    let mut num_iters = 0;

    // ---- SECANT PHASE ----

    let mut k_prev = max_k;
    let mut y_prev = error_max_k;
    let mut k = max_k - SECANT_START_OFFSET;
    let mut y = error(k);

    // NaN errors are treated as saturated and keep the search going down
    while !(is_zero(y, ZERO_TOL) || y <= 0.0) {
        if num_iters >= max_iters {
            warn!(
                "Secant search exhausted {} iterations at k = {} (y = {}), falling back to zero",
                max_iters, k, y
            );
            return RootResult {
                k: 0.0,
                num_iters,
                exhausted: true,
            };
        }
        num_iters += 1;

        let slope = (y - y_prev) / (k - k_prev);
        let k_min = MIN_STEP_FRACTION * k;

        // A flat or falling error means there is only one rising root between
        // k and zero, so halving can't skip it
        let k_new = if is_zero(slope, ZERO_TOL) || slope < 0.0 {
            k_min
        } else {
            (k - y / slope).max(k_min)
        };

        k_prev = k;
        y_prev = y;
        k = k_new;
        y = error(k);
    }

    if is_zero(y, ZERO_TOL) {
        return RootResult {
            k,
            num_iters,
            exhausted: false,
        };
    }

    // ---- REGULA FALSI PHASE ----

    let (mut k_neg, mut y_neg) = (k, y);
    let (mut k_pos, mut y_pos) = (k_prev, y_prev);

    loop {
        if num_iters >= max_iters {
            warn!(
                "Regula falsi exhausted {} iterations in [{}, {}], falling back to {}",
                max_iters, k_neg, k_pos, k_neg
            );
            return RootResult {
                k: k_neg,
                num_iters,
                exhausted: true,
            };
        }
        num_iters += 1;

        let k_new = (k_neg * y_pos - k_pos * y_neg) / (y_pos - y_neg);
        let y_new = error(k_new);

        if is_zero(y_new, ZERO_TOL) {
            return RootResult {
                k: k_new,
                num_iters,
                exhausted: false,
            };
        }

        if y_new < 0.0 {
            k_neg = k_new;
            y_neg = y_new;
        } else {
            k_pos = k_new;
            y_pos = y_new;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_linear() {
        let f = |k: f64| 2.0 * (k - 0.3);

        let r = find_root(f, 1.0, f(1.0), 100);

        assert!(!r.exhausted);
        assert!((r.k - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_cubic() {
        let f = |k: f64| k * k * k - 0.1;

        let r = find_root(f, 1.0, f(1.0), 100);

        assert!(!r.exhausted);
        assert!(f(r.k).abs() < 1e-9);
        assert!((r.k - 0.1f64.cbrt()).abs() < 1e-8);
    }

    #[test]
    fn test_reverse_slope() {
        // Error rises as k falls from 1 to 0.7, then falls to a root at 0.5,
        // so the first step must halve
        let f = |k: f64| {
            if k > 0.7 {
                1.0 + (1.0 - k)
            } else {
                1.3 * (k - 0.5) / 0.2
            }
        };

        let r = find_root(f, 1.0, f(1.0), 100);

        assert!(!r.exhausted);
        assert!(f(r.k).abs() < 1e-9);
        assert!((r.k - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_secant_exhausted() {
        // Never reaches zero so the secant phase runs out of iterations
        let mut evals = 0;
        let f = |_k: f64| {
            evals += 1;
            1.0
        };

        let r = find_root(f, 1.0, 1.0, 20);

        assert!(r.exhausted);
        assert_eq!(r.k, 0.0);
        assert_eq!(r.num_iters, 20);
        assert_eq!(evals, 21);
    }

    #[test]
    fn test_regula_falsi_exhausted() {
        // A step has no root, so regula falsi narrows onto the step without
        // converging
        let f = |k: f64| if k > 0.3 { 1.0 } else { -1.0 };

        let r = find_root(f, 1.0, 1.0, 30);

        assert!(r.exhausted);
        assert!(r.k <= 0.3);
        assert!(r.k >= 0.25);
        assert!(f(r.k) < 0.0);
    }

    #[test]
    fn test_already_at_root() {
        // Just inside the zero tolerance after the initial offset
        let f = |k: f64| (k - 1.0) * 1.5 + 1e-9;

        let r = find_root(f, 1.0, f(1.0), 10);

        assert!(!r.exhausted);
        assert_eq!(r.num_iters, 0);
        assert!((r.k - (1.0 - 1e-9)).abs() < 1e-15);
    }
}
