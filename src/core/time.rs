//! Shared timestamp helpers for preference records and export file names.

use chrono::{DateTime, TimeZone, Utc};

/// Returns unix-epoch milliseconds, the unit stored in `preferences.timestamp`.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Renders a stored record timestamp as RFC 3339 (e.g. `2026-10-18T09:30:00Z`).
pub fn format_millis_utc(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(ts) => ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        None => format!("{}ms", millis),
    }
}

/// `YYYYMMDD` and `HHMM` in UTC, used to stamp exported result files.
pub fn export_stamp(now: DateTime<Utc>) -> (String, String) {
    (
        now.format("%Y%m%d").to_string(),
        now.format("%H%M").to_string(),
    )
}
