//! Tolerant date parsing for feed entry fields.
//!
//! Upstream feeds put dates in inconsistent, occasionally free-text
//! fields, so parsing here is best-effort and never fails hard: any
//! string that cannot be interpreted yields `None` and a debug log.
//!
//! Formats seen in the wild:
//!   "Mon, 01 Jan 2024 00:00:00 GMT"   (RFC 2822 feed dates)
//!   "2024-01-01T00:00:00Z"            (RFC 3339 / ISO 8601)
//!   "2024-01-01"                       (bare prism/dc dates)
//!   "Published: 15 Mar 2024 online"    (date buried in noise text)

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use tracing::debug;

/// Sane bounds for the crude year fallback. Feeds occasionally carry
/// garbage numerics in date positions; anything outside this window is
/// rejected rather than trusted.
const MIN_SANE_YEAR: i32 = 2000;
const MAX_SANE_YEAR: i32 = 2100;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Parse an arbitrary date-ish string into a calendar date.
///
/// Tries strict well-known encodings first, then falls back to
/// scanning the string for an embedded date. Returns `None` on any
/// failure; never panics.
pub fn parse_flexible(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        debug!("empty date string");
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }

    if let Some(d) = scan_embedded_date(trimmed) {
        return Some(d);
    }

    debug!(text = %trimmed, "could not parse date string");
    None
}

/// Fuzzy pass: look for a date embedded in surrounding noise.
///
/// Two shapes are recognized: an ISO-style `YYYY-MM-DD` substring
/// anywhere in the text, and a three-token window matching
/// "15 Mar 2024" / "Mar 15 2024" (with trailing punctuation on the
/// tokens stripped).
fn scan_embedded_date(text: &str) -> Option<NaiveDate> {
    for start in 0..text.len().saturating_sub(9) {
        let Some(candidate) = text.get(start..start + 10) else {
            continue;
        };
        if candidate.as_bytes()[4] == b'-' && candidate.as_bytes()[7] == b'-' {
            if let Ok(d) = NaiveDate::parse_from_str(candidate, "%Y-%m-%d") {
                if (MIN_SANE_YEAR..=MAX_SANE_YEAR).contains(&d.year()) {
                    return Some(d);
                }
            }
        }
    }

    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|t| !t.is_empty())
        .collect();
    for window in tokens.windows(3) {
        let joined = format!("{} {} {}", window[0], window[1], window[2]);
        for fmt in ["%d %b %Y", "%d %B %Y", "%b %d %Y", "%B %d %Y"] {
            if let Ok(d) = NaiveDate::parse_from_str(&joined, fmt) {
                return Some(d);
            }
        }
    }
    None
}

/// Cruder fallback used when full parsing fails: read a 4-digit year
/// (and, separately, a 2-digit month) straight off the front of the
/// string. Some feed fields carry a recognizable `YYYY-MM` prefix even
/// when the rest of the value defeats the date grammar.
///
/// The year is accepted only within 2000..=2100 and the month only
/// within 1..=12; a month is never returned without a year.
pub fn crude_year_month(text: &str) -> (Option<i32>, Option<u32>) {
    let trimmed = text.trim();
    let year = trimmed
        .get(0..4)
        .and_then(|s| s.parse::<i32>().ok())
        .filter(|y| (MIN_SANE_YEAR..=MAX_SANE_YEAR).contains(y));
    if year.is_none() {
        return (None, None);
    }

    let month = trimmed
        .get(5..7)
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m));
    (year, month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc2822_feed_date() {
        let d = parse_flexible("Mon, 01 Jan 2024 00:00:00 GMT").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_parse_rfc3339() {
        let d = parse_flexible("2024-10-15T08:30:00Z").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 10, 15).unwrap());
    }

    #[test]
    fn test_parse_bare_iso_date() {
        let d = parse_flexible("2024-03-05").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_date_buried_in_noise() {
        let d = parse_flexible("First published online 2024-07-09 ahead of print").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 7, 9).unwrap());
    }

    #[test]
    fn test_parse_textual_date_in_noise() {
        let d = parse_flexible("Published: 15 Mar 2024 (online)").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_unparsable_inputs_return_none() {
        for garbage in ["", "   ", "not a date", "??-??-??", "çƒ∂", "13/45/9999"] {
            assert!(parse_flexible(garbage).is_none(), "accepted {garbage:?}");
        }
    }

    #[test]
    fn test_crude_year_and_month_prefix() {
        assert_eq!(crude_year_month("2024-06 issue"), (Some(2024), Some(6)));
    }

    #[test]
    fn test_crude_year_only_when_month_invalid() {
        assert_eq!(crude_year_month("2024-99"), (Some(2024), None));
        assert_eq!(crude_year_month("2024xx"), (Some(2024), None));
    }

    #[test]
    fn test_crude_rejects_implausible_year() {
        assert_eq!(crude_year_month("1823-05-01"), (None, None));
        assert_eq!(crude_year_month("9999"), (None, None));
        assert_eq!(crude_year_month("abcd-05"), (None, None));
    }

    #[test]
    fn test_crude_handles_short_and_multibyte_input() {
        assert_eq!(crude_year_month("20"), (None, None));
        assert_eq!(crude_year_month("é2024"), (None, None));
    }
}
