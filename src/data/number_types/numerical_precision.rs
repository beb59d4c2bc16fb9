//! Helper methods for the accuracy of floating point calculations.

/// Values closer together than this are considered equal.
///
/// Coefficients that get closer to zero than this are removed from expressions.
pub const EPSILON: f64 = 1e-8;

/// Whether two values are equal up to `EPSILON`.
pub fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < EPSILON
}

/// Whether a value is equal to zero up to `EPSILON`.
pub fn near_zero(value: f64) -> bool {
    approx(value, 0_f64)
}

/// Whether a value is negative, ignoring values that are zero up to `EPSILON`.
pub fn is_negative(value: f64) -> bool {
    value < -EPSILON
}

#[cfg(test)]
mod test {
    use crate::data::number_types::numerical_precision::{approx, is_negative, near_zero};

    #[test]
    fn test_approx() {
        assert!(approx(1_f64, 1_f64 + 1e-9));
        assert!(!approx(1_f64, 1_f64 + 1e-7));
        assert!(approx(-3.5, -3.5));
    }

    #[test]
    fn test_near_zero() {
        assert!(near_zero(0_f64));
        assert!(near_zero(-5e-9));
        assert!(!near_zero(2e-8));
    }

    #[test]
    fn test_is_negative() {
        assert!(is_negative(-1_f64));
        assert!(!is_negative(-1e-9));
        assert!(!is_negative(0_f64));
        assert!(!is_negative(4_f64));
    }
}
