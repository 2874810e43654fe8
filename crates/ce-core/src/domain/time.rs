//! Timestamp parsing and canonical rendering.
//!
//! Parsing is deliberately permissive: anything a browser-style date parser
//! would accept (RFC 3339, RFC 2822, ISO local date-times, plain dates, and
//! `Date.prototype.toString()` output) is recognized.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const ZONED_FORMATS: &[&str] = &[
    // Date.prototype.toString(), after the trailing "(Zone Name)" is removed
    "%a %b %d %Y %H:%M:%S GMT%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// Parse a timestamp in any supported notation.
#[must_use]
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc));
    }

    let without_zone_name = match input.find(" (") {
        Some(idx) if input.ends_with(')') => &input[..idx],
        _ => input,
    };
    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(without_zone_name, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render a timestamp as canonical text: UTC, millisecond precision, `Z`.
#[must_use]
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Canonical text for the current instant.
#[must_use]
pub fn now() -> String {
    format_timestamp(&Utc::now())
}

/// Canonicalize `input`, substituting the current time when it is unparseable.
#[must_use]
pub fn canonicalize(input: &str) -> String {
    parse_timestamp(input)
        .map(|dt| format_timestamp(&dt))
        .unwrap_or_else(now)
}
