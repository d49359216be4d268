//! Lenient parsing for numeric query parameters.
//!
//! Clients send values such as `page=`, `page=abc` or `month=0`. These are
//! treated as "not provided" so the caller can fall back to a default, instead
//! of rejecting the request.

/// Parse `raw` as a number, returning `None` when it is missing, blank, not a
/// finite number, or zero.
pub(crate) fn lenient_number(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();

    if raw.is_empty() {
        return None;
    }

    raw.parse::<f64>()
        .ok()
        .filter(|number| number.is_finite() && *number != 0.0)
}

/// Parse `raw` like [lenient_number] and clamp it to `min..=max`, using
/// `default` when no usable number was given.
///
/// Fractional values are truncated towards zero.
pub(crate) fn clamped_integer(raw: Option<&str>, default: i64, min: i64, max: i64) -> i64 {
    lenient_number(raw)
        .map(|number| number.trunc() as i64)
        .unwrap_or(default)
        .clamp(min, max)
}

/// Parse a parameter that must be a whole number, e.g. a month or a year.
///
/// Returns `None` for missing, blank or non-integer input.
pub(crate) fn strict_integer(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::{clamped_integer, lenient_number, strict_integer};

    #[test]
    fn blank_and_zero_are_not_numbers() {
        assert_eq!(lenient_number(None), None);
        assert_eq!(lenient_number(Some("")), None);
        assert_eq!(lenient_number(Some("   ")), None);
        assert_eq!(lenient_number(Some("0")), None);
        assert_eq!(lenient_number(Some("abc")), None);
        assert_eq!(lenient_number(Some("NaN")), None);
        assert_eq!(lenient_number(Some("inf")), None);
    }

    #[test]
    fn parses_padded_and_fractional_numbers() {
        assert_eq!(lenient_number(Some(" 42 ")), Some(42.0));
        assert_eq!(lenient_number(Some("-3.5")), Some(-3.5));
        assert_eq!(lenient_number(Some("1e2")), Some(100.0));
    }

    #[test]
    fn clamps_to_range() {
        assert_eq!(clamped_integer(Some("500"), 10, 1, 100), 100);
        assert_eq!(clamped_integer(Some("-5"), 10, 1, 100), 1);
        assert_eq!(clamped_integer(Some("7.9"), 10, 1, 100), 7);
        assert_eq!(clamped_integer(None, 10, 1, 100), 10);
        assert_eq!(clamped_integer(Some("0"), 10, 1, 100), 10);
    }

    #[test]
    fn strict_integer_rejects_fractions() {
        assert_eq!(strict_integer(Some("2022")), Some(2022));
        assert_eq!(strict_integer(Some(" 3 ")), Some(3));
        assert_eq!(strict_integer(Some("3.5")), None);
        assert_eq!(strict_integer(Some("")), None);
        assert_eq!(strict_integer(None), None);
    }
}
