//! Calorie unit sanitizer
//!
//! Corrects unit confusion in raw calorie values before any other rule
//! sees them. Some upstream sources report energy in joules instead of
//! kilocalories, and the model fallback has no unit discipline at all.

use crate::models::KCAL_CEILING;

/// Joules per kilocalorie
const JOULES_PER_KCAL: f64 = 4184.0;

/// Values above this are not even plausible joule readings
const IMPLAUSIBLE_KCAL: f64 = 500_000.0;

/// Turn a raw numeric calorie value into a sane kilocalorie integer.
///
/// Returns None for non-finite or non-positive input. A value above the
/// per-serving ceiling but below the implausibility threshold is assumed
/// to be joules and converted; anything still out of range is clamped to
/// the ceiling.
pub fn sanitize_kcal(raw: f64) -> Option<i64> {
    if !raw.is_finite() || raw <= 0.0 {
        return None;
    }

    if raw > IMPLAUSIBLE_KCAL {
        return Some(KCAL_CEILING);
    }

    if raw > KCAL_CEILING as f64 {
        // Joule reading: 1 kcal ~= 4184 J
        let converted = (raw / JOULES_PER_KCAL).round() as i64;
        return Some(converted.min(KCAL_CEILING));
    }

    Some(raw.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(sanitize_kcal(0.0), None);
        assert_eq!(sanitize_kcal(-5.0), None);
        assert_eq!(sanitize_kcal(f64::NAN), None);
        assert_eq!(sanitize_kcal(f64::INFINITY), None);
    }

    #[test]
    fn test_passes_plausible_values() {
        assert_eq!(sanitize_kcal(136.4), Some(136));
        assert_eq!(sanitize_kcal(2000.0), Some(2000));
        assert_eq!(sanitize_kcal(0.6), Some(1));
    }

    #[test]
    fn test_converts_joules() {
        // 570720 J ~= 136 kcal
        assert_eq!(sanitize_kcal(570_720.0), Some(136));
        // 490000 J ~= 117 kcal
        assert_eq!(sanitize_kcal(490_000.0), Some(117));
        // 10000 J ~= 2 kcal
        assert_eq!(sanitize_kcal(10_000.0), Some(2));
    }

    #[test]
    fn test_implausible_values_clamp_directly() {
        assert_eq!(sanitize_kcal(500_001.0), Some(2000));
        assert_eq!(sanitize_kcal(9_000_000.0), Some(2000));
    }
}
