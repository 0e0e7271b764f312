//! Timestamp utilities
//!
//! Client payloads carry dates in two shapes: full RFC 3339 timestamps for
//! confirmation/processing times and bare `YYYY-MM-DD` dates for collection
//! and disposal dates. Reconciliation needs both normalized to UTC instants.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a client-supplied date or timestamp string into a UTC instant.
///
/// Accepts RFC 3339 (`2020-04-02T13:05:00Z`), a space-separated datetime
/// (`2020-04-02 13:05:00`), or a bare date (`2020-04-02`, midnight UTC).
/// Returns `None` for empty or unparseable input.
pub fn parse_flexible(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

/// Parse a date bound for reconciliation windows (`YYYY-MM-DD`).
///
/// The end bound is inclusive, so callers extend it to the end of that day.
pub fn parse_date_bound(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Unix-second bounds of an inclusive date window: midnight on the start
/// date through the last second of the end date
pub fn window_bounds(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
    let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
    let end_ts = end.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_399;
    (start_ts, end_ts)
}
