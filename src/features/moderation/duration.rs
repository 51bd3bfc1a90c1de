//! Timeout duration parsing.

use regex::Regex;
use std::sync::OnceLock;

/// Platform ceiling for a timeout: 28 days in milliseconds.
pub const MAX_TIMEOUT_MS: i64 = 28 * 24 * 60 * 60 * 1000;

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^(\d+)([smhd])$").unwrap())
}

/// Parse a duration string like `1h`, `30m`, `1d` into milliseconds.
///
/// Returns `None` for anything that does not match `^(\d+)([smhd])$`
/// (case-insensitive) or that exceeds the 28-day platform maximum, so the
/// caller rejects before any mutation.
pub fn parse_duration(input: &str) -> Option<i64> {
    let captures = duration_pattern().captures(input)?;
    let value: i64 = captures.get(1)?.as_str().parse().ok()?;
    let multiplier = match captures.get(2)?.as_str().to_ascii_lowercase().as_str() {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        _ => return None,
    };

    let ms = value.checked_mul(multiplier)?;
    if ms > MAX_TIMEOUT_MS {
        return None;
    }
    Some(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_map_to_milliseconds() {
        assert_eq!(parse_duration("1s"), Some(1_000));
        assert_eq!(parse_duration("1m"), Some(60_000));
        assert_eq!(parse_duration("1h"), Some(3_600_000));
        assert_eq!(parse_duration("1d"), Some(86_400_000));
        assert_eq!(parse_duration("90m"), Some(5_400_000));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(parse_duration("2H"), Some(7_200_000));
        assert_eq!(parse_duration("3D"), Some(259_200_000));
    }

    #[test]
    fn test_max_28_days() {
        assert_eq!(parse_duration("28d"), Some(MAX_TIMEOUT_MS));
        assert_eq!(parse_duration("29d"), None);
        assert_eq!(parse_duration("40d"), None);
        assert_eq!(parse_duration("2419201s"), None);
    }

    #[test]
    fn test_malformed_rejected() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("h"), None);
        assert_eq!(parse_duration("10"), None);
        assert_eq!(parse_duration("10w"), None);
        assert_eq!(parse_duration("1h30m"), None);
        assert_eq!(parse_duration("-5m"), None);
        assert_eq!(parse_duration("5 m"), None);
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(parse_duration("99999999999999999999d"), None);
    }
}
