//! Device log timestamps.
//!
//! Syslog lines carry `"Mon D HH:MM:SS[.fff]"` without a year, so every
//! conversion to a calendar time needs a reference year from the caller.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Result, ScanError};

const LOG_FORMATS: &[&str] = &["%Y %b %d %H:%M:%S%.f", "%Y %b %d %H:%M:%S"];

/// Format used by `show logging start … end …`.
pub const LOGGING_WINDOW_FORMAT: &str = "%Y %b %d %H:%M:%S";

/// Parse a device timestamp such as `"Dec 11 15:30:57"` in `year`.
///
/// Runs of whitespace between fields are tolerated (devices pad single-digit
/// days with an extra space).
pub fn parse_log_timestamp(text: &str, year: i32) -> Result<NaiveDateTime> {
    let normalised = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !normalised.is_empty() {
        let with_year = format!("{year} {normalised}");
        for fmt in LOG_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&with_year, fmt) {
                return Ok(dt);
            }
        }
    }
    Err(ScanError::TimestampParse {
        value: text.to_string(),
        year,
    })
}

/// Parse a `YYYY-MM-DD` date as given on the command line.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| ScanError::Config(format!("invalid date \"{text}\": {e}")))
}

/// Combine a date with an `HH:MM:SS` time of day.
pub fn at_time(date: NaiveDate, time: &str) -> Result<NaiveDateTime> {
    let text = format!("{} {}", date.format("%Y-%m-%d"), time.trim());
    NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| ScanError::Config(format!("invalid time \"{time}\": {e}")))
}
