//! Window-key grammar and duration parsing.
//!
//! A window key is a positive integer followed by a unit suffix, e.g.
//! `24h`. Suffixes: `s`/`S` seconds, `m`/`M` minutes, `h` hours, `d` days.

use once_cell::sync::Lazy;
use regex::Regex;

/// Grammar for the optional `window` query parameter. The empty string
/// selects the all-time view.
static WINDOW_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([1-9][0-9]*[hmMdsS])?$").expect("window key regex"));

/// Default window every game is configured with.
pub const DEFAULT_WINDOW_KEY: &str = "24h";

/// Duration of the default window in milliseconds.
pub const DEFAULT_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Whether `key` is a syntactically valid, non-empty window key.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && WINDOW_KEY_RE.is_match(key)
}

/// Parse a window key into a duration in milliseconds.
///
/// Returns `None` for anything outside the grammar.
pub fn parse_duration_ms(key: &str) -> Option<i64> {
    if !is_valid_key(key) {
        return None;
    }
    let (digits, suffix) = key.split_at(key.len() - 1);
    let count: i64 = digits.parse().ok()?;
    let unit_ms = match suffix {
        "s" | "S" => 1000,
        "m" | "M" => 60 * 1000,
        "h" => 60 * 60 * 1000,
        "d" => 24 * 60 * 60 * 1000,
        _ => return None,
    };
    count.checked_mul(unit_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        assert!(is_valid_key("24h"));
        assert!(is_valid_key("7d"));
        assert!(is_valid_key("90m"));
        assert!(is_valid_key("30s"));
        assert!(is_valid_key("15M"));
    }

    #[test]
    fn test_invalid_keys() {
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("0h"));
        assert!(!is_valid_key("h"));
        assert!(!is_valid_key("24"));
        assert!(!is_valid_key("24hh"));
        assert!(!is_valid_key("-1h"));
        assert!(!is_valid_key("1w"));
        assert!(!is_valid_key("24 h"));
    }

    #[test]
    fn test_parse_durations() {
        assert_eq!(parse_duration_ms("24h"), Some(DEFAULT_WINDOW_MS));
        assert_eq!(parse_duration_ms("1s"), Some(1000));
        assert_eq!(parse_duration_ms("2m"), Some(120_000));
        assert_eq!(parse_duration_ms("1d"), Some(86_400_000));
        assert_eq!(parse_duration_ms("1w"), None);
        assert_eq!(parse_duration_ms(""), None);
    }
}
