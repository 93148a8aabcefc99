//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a count to f64, allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Floor a non-negative f64 into a usize index, returning 0 for NaN or negative values.
#[must_use]
pub fn floor_f64_to_usize(value: f64) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    cast::<f64, usize>(value.floor()).unwrap_or(usize::MAX)
}

/// Map a raw 64-bit draw onto the half-open unit interval `[0, 1)`.
///
/// Uses the top 53 bits so every representable value is equally likely and
/// the result never reaches 1.0.
#[must_use]
pub fn unit_interval(sample: u64) -> f64 {
    const SCALE: f64 = 1.0 / 9_007_199_254_740_992.0; // 2^53
    u64_to_f64(sample >> 11) * SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_convert_exactly_for_small_values() {
        assert!((count_to_f64(162) - 162.0).abs() < f64::EPSILON);
        assert!((u64_to_f64(10_000) - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn floor_handles_nan_and_negatives() {
        assert_eq!(floor_f64_to_usize(f64::NAN), 0);
        assert_eq!(floor_f64_to_usize(-3.2), 0);
        assert_eq!(floor_f64_to_usize(4.99), 4);
    }

    #[test]
    fn unit_interval_stays_half_open() {
        assert!(unit_interval(0).abs() < f64::EPSILON);
        let top = unit_interval(u64::MAX);
        assert!(top < 1.0);
        assert!(top > 0.999_999);
    }
}
