//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Return true if the magnitude of the value is strictly below the tolerance.
pub fn is_zero<T>(value: T, tolerance: T) -> bool
where
    T: Float,
{
    value.abs() < tolerance
}

/// Limit a value to the range `[min, max]`.
///
/// NaN values are passed through unchanged.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_is_zero() {
        assert!(is_zero(0f64, 1e-9));
        assert!(is_zero(-5e-10f64, 1e-9));
        assert!(!is_zero(1e-9f64, 1e-9));
        assert!(!is_zero(-2.0f32, 1e-3));
        assert!(!is_zero(f64::NAN, 1e-9));
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(0.5f64, 0.0, 1.0), 0.5);
        assert_eq!(clamp(1.5f64, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-0.5f64, 0.0, 1.0), 0.0);
        assert!(clamp(f64::NAN, 0.0, 1.0).is_nan());
    }
}
