//! Date/time helpers for timestamps stored by SQLite.
//!
//! Timestamps are written by `datetime('now')`, i.e. UTC in
//! `YYYY-MM-DD HH:MM:SS` form.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Format used on pages.
pub const PAGE_DATE_FORMAT: &str = "%b %-d, %Y %H:%M";

/// Parse a stored timestamp (SQLite or RFC3339 form) as UTC.
pub fn parse_db_datetime(datetime_str: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(datetime_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a stored timestamp in the given timezone.
///
/// Returns the input unchanged if it cannot be parsed. An unknown timezone
/// falls back to UTC.
pub fn format_datetime(datetime_str: &str, timezone: &str, format: &str) -> String {
    let Some(utc) = parse_db_datetime(datetime_str) else {
        return datetime_str.to_string();
    };
    match timezone.parse::<Tz>() {
        Ok(tz) => utc.with_timezone(&tz).format(format).to_string(),
        Err(_) => utc.format(format).to_string(),
    }
}

/// Format a stored timestamp for display on pages.
pub fn format_page_date(datetime_str: &str, timezone: &str) -> String {
    format_datetime(datetime_str, timezone, PAGE_DATE_FORMAT)
}

/// Convert a stored timestamp to RFC3339 for API responses.
///
/// ```
/// use filehost::datetime::to_rfc3339;
///
/// assert_eq!(to_rfc3339("2024-01-15 10:30:00"), "2024-01-15T10:30:00Z");
/// ```
pub fn to_rfc3339(datetime_str: &str) -> String {
    match parse_db_datetime(datetime_str) {
        Some(dt) => dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        None => datetime_str.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_datetime_in_timezone() {
        let result = format_datetime("2024-01-15 10:30:00", "Asia/Tokyo", "%Y/%m/%d %H:%M");
        assert_eq!(result, "2024/01/15 19:30");
    }

    #[test]
    fn test_format_datetime_rfc3339_input() {
        let result = format_datetime("2024-01-15T10:30:00+00:00", "UTC", "%Y-%m-%d %H:%M");
        assert_eq!(result, "2024-01-15 10:30");
    }

    #[test]
    fn test_format_datetime_unknown_timezone_uses_utc() {
        let result = format_datetime("2024-01-15 10:30:00", "Nowhere/Zone", "%H:%M");
        assert_eq!(result, "10:30");
    }

    #[test]
    fn test_format_datetime_unparseable() {
        assert_eq!(format_datetime("yesterday", "UTC", "%H:%M"), "yesterday");
    }

    #[test]
    fn test_format_page_date() {
        assert_eq!(
            format_page_date("2024-03-05 08:07:00", "UTC"),
            "Mar 5, 2024 08:07"
        );
    }

    #[test]
    fn test_to_rfc3339() {
        assert_eq!(to_rfc3339("2024-12-31 23:59:59"), "2024-12-31T23:59:59Z");
        assert_eq!(to_rfc3339("garbage"), "garbage");
    }
}
