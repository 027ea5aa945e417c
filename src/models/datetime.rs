use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // RFC 2822, as found in feeds (e.g., "Sun, 11 Jan 2026 12:34:56 +0000")
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite / ISO without offset (e.g., "2026-01-11 12:34:56.123456")
    for format in [STORAGE_FORMAT, "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

/// Rewrites a date string into the form archives store dates in.
pub fn normalize_datetime(s: &str) -> Option<String> {
    parse_datetime(s).map(|dt| dt.format(STORAGE_FORMAT).to_string())
}

pub fn to_rfc3339(s: &str) -> Option<String> {
    parse_datetime(s).map(|dt| dt.to_rfc3339())
}
