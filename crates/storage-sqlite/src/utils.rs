//! Shared helpers for the storage layer.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Stored timestamp format. Fixed-width and second-precise, so that
/// lexicographic comparison in SQL matches chronological order (the
/// due-date scan relies on this).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_timestamp_opt(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(format_timestamp)
}

/// Parses a stored timestamp, falling back to the epoch on corrupt input
/// rather than failing the whole row load; the failure is logged for
/// reconciliation.
pub fn parse_timestamp(raw: &str, field_name: &str) -> DateTime<Utc> {
    match NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        Ok(naive) => Utc.from_utc_datetime(&naive),
        Err(e) => {
            // Older rows may carry RFC 3339
            if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
                return parsed.with_timezone(&Utc);
            }
            log::error!(
                "Failed to parse {} '{}': {}. Falling back to epoch.",
                field_name,
                raw,
                e
            );
            Utc.timestamp_opt(0, 0).single().unwrap_or_default()
        }
    }
}

pub fn parse_timestamp_opt(raw: Option<&str>, field_name: &str) -> Option<DateTime<Utc>> {
    raw.map(|value| parse_timestamp(value, field_name))
}
