//! Duration parser for CLI arguments.
//!
//! Accepts the Go-style duration text monitoring agents usually pass:
//! - Single unit: `10s`, `500ms`, `2m`
//! - Compound: `1m30s`, `1h15m`
//! - Fractional: `1.5s`, `.5h`
//! - Bare zero: `0`

use std::time::Duration;

/// Error type for duration parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to parse duration '{input}': {message}")]
pub struct DurationParseError {
    pub input: String,
    pub message: String,
}

impl DurationParseError {
    fn new(input: &str, message: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            message: message.into(),
        }
    }
}

/// Parse a duration string such as `10s` or `1m30s`.
///
/// # Supported units
///
/// | Unit | Meaning |
/// |------|---------|
/// | `ns` | nanoseconds |
/// | `us`, `µs` | microseconds |
/// | `ms` | milliseconds |
/// | `s` | seconds |
/// | `m` | minutes |
/// | `h` | hours |
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use mysql_lite::util::parse_duration;
///
/// assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
/// assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let input = input.trim();

    if input == "0" {
        return Ok(Duration::ZERO);
    }
    if input.is_empty() {
        return Err(DurationParseError::new(input, "empty duration"));
    }
    if input.starts_with('-') {
        return Err(DurationParseError::new(input, "negative durations are not allowed"));
    }

    let mut rest = input.strip_prefix('+').unwrap_or(input);
    if rest.is_empty() {
        return Err(DurationParseError::new(input, "missing number"));
    }

    let mut total_nanos: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_len];
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let segment = segment_nanos(input, number, unit)?;
        total_nanos = total_nanos
            .checked_add(segment)
            .ok_or_else(|| DurationParseError::new(input, "duration overflow"))?;
    }

    let nanos = u64::try_from(total_nanos)
        .map_err(|_| DurationParseError::new(input, "duration overflow"))?;
    Ok(Duration::from_nanos(nanos))
}

/// Nanoseconds in one unit.
fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3600 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}

/// Converts one `<number><unit>` segment to nanoseconds.
fn segment_nanos(input: &str, number: &str, unit: &str) -> Result<u128, DurationParseError> {
    if number.is_empty() || number == "." {
        return Err(DurationParseError::new(input, "missing number"));
    }
    if unit.is_empty() {
        return Err(DurationParseError::new(
            input,
            format!("missing unit after '{}' (use ns, us, ms, s, m or h)", number),
        ));
    }
    let scale = unit_nanos(unit).ok_or_else(|| {
        DurationParseError::new(
            input,
            format!("unknown unit '{}' (use ns, us, ms, s, m or h)", unit),
        )
    })?;

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if fraction.contains('.') {
        return Err(DurationParseError::new(
            input,
            format!("invalid number '{}'", number),
        ));
    }

    let overflow = || DurationParseError::new(input, "duration overflow");

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;

    if !fraction.is_empty() {
        // Digits beyond nanosecond precision of an hour cannot matter.
        let digits = &fraction[..fraction.len().min(18)];
        let value: u128 = digits.parse().map_err(|_| overflow())?;
        let divisor = 10u128.pow(digits.len() as u32);
        nanos = nanos
            .checked_add(value * scale / divisor)
            .ok_or_else(overflow)?;
    }

    Ok(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_sub_second_units() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("750us").unwrap(), Duration::from_micros(750));
        assert_eq!(parse_duration("750µs").unwrap(), Duration::from_micros(750));
        assert_eq!(parse_duration("42ns").unwrap(), Duration::from_nanos(42));
    }

    #[test]
    fn test_parse_compound() {
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1h15m").unwrap(), Duration::from_secs(4500));
    }

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration(".5h").unwrap(), Duration::from_secs(1800));
    }

    #[test]
    fn test_parse_zero_and_plus_sign() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("+3s").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn test_missing_unit_rejected() {
        let err = parse_duration("10").unwrap_err();
        assert!(err.message.contains("missing unit"));
    }

    #[test]
    fn test_unknown_unit_rejected() {
        let err = parse_duration("10d").unwrap_err();
        assert!(err.message.contains("unknown unit 'd'"));
    }

    #[test]
    fn test_negative_and_empty_rejected() {
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("+").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("1.2.3s").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = parse_duration("soon").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse duration 'soon'"));
    }
}
