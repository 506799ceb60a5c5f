//! Datetime helpers. SQLite stores timestamps as `datetime('now')` text, so
//! everything that leaves the store goes through a parse with a fallback for
//! the RFC3339 strings older rows may carry.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Format produced by SQLite's `datetime('now')`.
pub const DB_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a stored timestamp, accepting RFC3339 or the plain SQLite format.
pub fn parse_db_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(raw, DB_DATETIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Normalizes a client-supplied event datetime into the stored format.
///
/// Accepts RFC3339, `datetime-local` input values (with or without seconds),
/// the stored format itself, and a bare date, which lands at midnight.
/// Returns `None` when nothing matches so the caller can reject the input.
pub fn normalize_event_datetime(raw: &str) -> Option<String> {
    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return Some(dt.naive_utc().format(DB_DATETIME_FORMAT).to_string());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", DB_DATETIME_FORMAT, "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.format(DB_DATETIME_FORMAT).to_string());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        return Some(naive.format(DB_DATETIME_FORMAT).to_string());
    }
    None
}
