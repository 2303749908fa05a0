//! Cumulative drop probability and its display format.
//!
//! The chance of at least one success in `n` independent attempts at
//! `1/denominator` is `1 - (1 - 1/denominator)^n`. It is evaluated in
//! log space (`ln_1p` / `exp_m1`) so that very rare drops (large
//! denominators) keep their precision even after millions of attempts.

use crate::error::DropError;

/// Percentage (`0..=100`) of having succeeded at least once.
///
/// # Errors
///
/// [`DropError::InvalidInput`] when `denominator` is not finite or `<= 0`.
#[allow(clippy::cast_precision_loss)]
pub fn probability_at_least_once(denominator: f64, attempts: u64) -> Result<f64, DropError> {
    if !denominator.is_finite() || denominator <= 0.0 {
        return Err(DropError::InvalidInput { denominator });
    }
    if attempts == 0 {
        return Ok(0.0);
    }

    let per_attempt = denominator.recip();
    // A denominator below 1 makes the miss chance `1 - p` negative, where
    // `ln_1p` is NaN.
    if per_attempt > 1.0 {
        return Ok(100.0);
    }

    // 1 - (1 - p)^n == -expm1(n * ln(1 - p))
    let log_miss = (attempts as f64) * (-per_attempt).ln_1p();
    let hit = -log_miss.exp_m1();
    Ok((hit * 100.0).clamp(0.0, 100.0))
}

/// Format a percentage with precision tiered for rare events.
///
/// | value            | output            |
/// |------------------|-------------------|
/// | not finite       | `-`               |
/// | `0`              | `0.000%`          |
/// | `0 < x < 0.01`   | 4 decimal places  |
/// | `0.01 <= x < 1`  | 3 decimal places  |
/// | `x >= 1`         | 2 decimal places  |
#[must_use]
pub fn format_percent(x: f64) -> String {
    if !x.is_finite() {
        return "-".to_string();
    }
    if x == 0.0 {
        return "0.000%".to_string();
    }
    if x < 0.01 {
        format!("{x:.4}%")
    } else if x < 1.0 {
        format!("{x:.3}%")
    } else {
        format!("{x:.2}%")
    }
}

/// Probability rendered for display; `-` when it cannot be computed
/// (including an unset `0` denominator).
#[must_use]
pub fn display_probability(denominator: u32, attempts: u64) -> String {
    probability_at_least_once(f64::from(denominator), attempts)
        .map_or_else(|_| "-".to_string(), format_percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn zero_attempts_is_exactly_zero() {
        assert_eq!(probability_at_least_once(64.0, 0).unwrap(), 0.0);
        assert_eq!(probability_at_least_once(4096.0, 0).unwrap(), 0.0);
    }

    #[test]
    fn matches_closed_form() {
        let p = probability_at_least_once(64.0, 10).unwrap();
        let expected = 100.0 * (1.0 - (63.0_f64 / 64.0).powi(10));
        assert!(close(p, expected, 1e-9), "{p} vs {expected}");
        assert_eq!(format_percent(p), "14.57%");
    }

    #[test]
    fn single_attempt_is_one_over_denominator() {
        let p = probability_at_least_once(4096.0, 1).unwrap();
        assert!(close(p, 100.0 / 4096.0, 1e-12));
        assert_eq!(format_percent(p), "0.024%");
    }

    #[test]
    fn huge_denominators_keep_precision() {
        let p = probability_at_least_once(1e12, 1).unwrap();
        assert!(close(p, 1e-10, 1e-18), "{p}");
    }

    #[test]
    fn large_attempt_counts_approach_but_never_exceed_100() {
        let p = probability_at_least_once(8.0, 10_000).unwrap();
        assert!(p <= 100.0);
        assert!(p > 99.999);
    }

    #[test]
    fn denominator_one_is_certain() {
        for attempts in [1, 2, 1_000] {
            assert_eq!(probability_at_least_once(1.0, attempts).unwrap(), 100.0);
        }
    }

    #[test]
    fn fractional_denominators_saturate() {
        for denom in [0.5, 0.25, f64::MIN_POSITIVE] {
            let p = probability_at_least_once(denom, 3).unwrap();
            assert!(p.is_finite());
            assert_eq!(p, 100.0);
        }
        assert_eq!(probability_at_least_once(0.5, 0).unwrap(), 0.0);
    }

    #[test]
    fn rejects_non_positive_and_non_finite_denominators() {
        for denom in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                probability_at_least_once(denom, 5),
                Err(DropError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn format_tiers() {
        assert_eq!(format_percent(f64::NAN), "-");
        assert_eq!(format_percent(f64::INFINITY), "-");
        assert_eq!(format_percent(0.0), "0.000%");
        assert_eq!(format_percent(0.001_234_5), "0.0012%");
        assert_eq!(format_percent(0.009_9), "0.0099%");
        assert_eq!(format_percent(0.01), "0.010%");
        assert_eq!(format_percent(0.5), "0.500%");
        assert_eq!(format_percent(0.999), "0.999%");
        assert_eq!(format_percent(1.0), "1.00%");
        assert_eq!(format_percent(100.0), "100.00%");
    }

    #[test]
    fn format_tier_boundaries_pick_decimal_count() {
        let decimals = |s: &str| s.trim_end_matches('%').split('.').nth(1).map_or(0, str::len);
        assert_eq!(decimals(&format_percent(0.009_999)), 4);
        assert_eq!(decimals(&format_percent(0.01)), 3);
        assert_eq!(decimals(&format_percent(0.999)), 3);
        assert_eq!(decimals(&format_percent(1.0)), 2);
    }

    #[test]
    fn display_handles_unset_rate() {
        assert_eq!(display_probability(0, 10), "-");
        assert_eq!(display_probability(64, 10), "14.57%");
        assert_eq!(display_probability(64, 0), "0.000%");
    }
}
