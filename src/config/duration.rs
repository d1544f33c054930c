//! Duration parsing utilities.

use anyhow::Context;
use std::time::Duration;

/// Parse a duration string like "250ms", "2s", "1m", "1h" or "0.5".
///
/// Plain numbers are seconds and may be fractional.
pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    let (num_str, to_secs): (&str, fn(f64) -> f64) = if let Some(n) = s.strip_suffix("ms") {
        (n, |v| v / 1000.0)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, |v| v * 3600.0)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, |v| v * 60.0)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, |v| v)
    } else {
        (s, |v| v)
    };

    let value: f64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration value: {s}"))?;
    Duration::try_from_secs_f64(to_secs(value))
        .with_context(|| format!("Duration out of range: {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_plain_seconds() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration(" 0.5 ").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("-1s").is_err());
    }
}
