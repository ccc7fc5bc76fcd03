use chrono::{DateTime, NaiveDateTime};

/// Wall-clock time at `utc_offset_seconds` for a unix timestamp in seconds.
pub fn to_local(timestamp: f64, utc_offset_seconds: i32) -> Option<NaiveDateTime> {
    if !timestamp.is_finite() {
        return None;
    }
    let shifted = timestamp.floor() as i64 + utc_offset_seconds as i64;
    DateTime::from_timestamp(shifted, 0).map(|dt| dt.naive_utc())
}

/// Inverse of [`to_local`].
pub fn from_local(local: NaiveDateTime, utc_offset_seconds: i32) -> f64 {
    (local.and_utc().timestamp() - utc_offset_seconds as i64) as f64
}

/// Formats a unix timestamp with a `strftime` pattern in the given offset.
/// Unrepresentable timestamps render as an empty label.
pub fn format_time_label(timestamp: f64, utc_offset_seconds: i32, pattern: &str) -> String {
    to_local(timestamp, utc_offset_seconds)
        .map(|local| local.format(pattern).to_string())
        .unwrap_or_default()
}

/// Label used by the selection readout.
pub fn format_quote_time(timestamp: f64, utc_offset_seconds: i32) -> String {
    format_time_label(timestamp, utc_offset_seconds, "%d %b %Y %H:%M")
}
