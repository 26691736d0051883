//! Floating point helpers shared by the aggregation and normalization code.

use approx::AbsDiffEq;

/// Tolerance used when checking that normalized fractions sum to one.
pub const FRACTION_ACC: f64 = 1e-9;

/// Compares if two floats are close via `approx::abs_diff_eq` using a maximum absolute difference
/// (epsilon) of `acc`.
#[must_use]
pub fn almost_eq(a: f64, b: f64, acc: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a == b;
    }
    a.abs_diff_eq(&b, acc)
}

/// Arithmetic mean. `NaN` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `N`, not `N - 1`). `NaN` for an empty slice.
#[must_use]
pub fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    if m.is_nan() {
        return m;
    }
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Mean and population standard deviation of `values`.
#[must_use]
pub fn mean_and_std(values: &[f64]) -> (f64, f64) {
    (mean(values), population_std(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;

    #[test]
    fn almost_eq_within_tolerance() {
        assert!(almost_eq(1.0, 1.0 + 0.5e-11, 1e-10));
        assert!(!almost_eq(1.0, 1.0 + 2e-10, 1e-10));
    }

    #[test]
    fn almost_eq_infinities() {
        assert!(almost_eq(f64::INFINITY, f64::INFINITY, FRACTION_ACC));
        assert!(!almost_eq(f64::INFINITY, f64::NEG_INFINITY, FRACTION_ACC));
    }

    #[test]
    fn mean_and_population_std() {
        let (m, s) = mean_and_std(&[1.0, 2.0, 3.0]);
        assert_almost_eq!(m, 2.0, 1e-12);
        assert_almost_eq!(s, (2.0f64 / 3.0).sqrt(), 1e-12);
    }

    #[test]
    fn single_value_has_zero_std() {
        assert_eq!(population_std(&[4.5]), 0.0);
    }

    #[test]
    fn empty_input_is_nan() {
        assert!(mean(&[]).is_nan());
        assert!(population_std(&[]).is_nan());
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn assert_almost_eq_macro_panics() {
        assert_almost_eq!(1.0, 1.001, 1e-4);
    }
}
