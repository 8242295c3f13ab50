use chrono::{DateTime, FixedOffset, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// chrono format of every timestamp in the export files, e.g. `2021-01-01T00:30:00+0100`.
pub const TIMEPOINT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

// chrono's `%z` also takes `+01:00` and `%Y` takes any digit count, so the
// shape is pinned down before handing the string to chrono.
static TIMEPOINT_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}[+-]\d{4}$").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("timestamp {0:?} is not in YYYY-MM-DDTHH:MM:SS±HHMM form")]
    Shape(String),
    #[error("timestamp {value:?} is out of range: {reason}")]
    Range { value: String, reason: String },
}

/// Parse `"YYYY-MM-DDTHH:MM:SS±HHMM"` → offset-aware instant
pub fn parse_timepoint(s: &str) -> Result<DateTime<FixedOffset>, TimestampError> {
    let s = s.trim();
    if !TIMEPOINT_SHAPE.is_match(s) {
        return Err(TimestampError::Shape(s.to_string()));
    }
    DateTime::parse_from_str(s, TIMEPOINT_FORMAT).map_err(|e| TimestampError::Range {
        value: s.to_string(),
        reason: e.to_string(),
    })
}

/// Inverse of [`parse_timepoint`], in whatever zone `t` carries.
pub fn format_timepoint<Tz>(t: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    t.format(TIMEPOINT_FORMAT).to_string()
}
