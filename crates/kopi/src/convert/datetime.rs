//! Date and time converters.
//!
//! A datetime target accepts an already-typed datetime, a numeric epoch in
//! milliseconds, or text matched against a fixed pattern list (or one
//! caller-supplied pattern). Dates and times of day ride on the same rules
//! and keep their part of the result.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use num_traits::ToPrimitive;

use crate::convert::ConverterRegistry;
use crate::value::{Value, DATETIME_PATTERN};

/// Patterns tried in order when a datetime is parsed from bare text.
///
/// `%.f` also matches an absent fraction, so each fractional pattern
/// covers its plain form too.
pub const DEFAULT_DATETIME_PATTERNS: &[&str] = &[
    DATETIME_PATTERN,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d",
];

/// Patterns tried for bare time-of-day text.
pub const DEFAULT_TIME_PATTERNS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Milliseconds since the Unix epoch, UTC-interpreted.
pub(crate) fn epoch_millis(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}

fn from_epoch_millis(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

fn parse_datetime_text(text: &str, pattern: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, pattern) {
        return Some(dt);
    }
    // Date-only patterns parse as a bare date and land at midnight.
    NaiveDate::parse_from_str(text, pattern)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Epoch-milliseconds reading of a numeric value. Booleans are not
/// temporal and stay out.
fn numeric_epoch(value: &Value) -> Option<NaiveDateTime> {
    let ms = match value {
        Value::Int(i) => Some(*i),
        Value::UInt(u) => i64::try_from(*u).ok(),
        Value::Float(x) => {
            if !x.is_finite() {
                return None;
            }
            let t = x.trunc();
            if t >= i64::MIN as f64 && t < i64::MAX as f64 {
                Some(t as i64)
            } else {
                None
            }
        }
        Value::BigInt(b) => b.to_i64(),
        Value::Decimal(d) => i64::try_from(d.to_i128_trunc()).ok(),
        _ => None,
    }?;
    from_epoch_millis(ms)
}

/// Convert to a datetime: identity, numeric epoch milliseconds, or text
/// against the default pattern list.
pub fn value_to_datetime(_registry: &ConverterRegistry, value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(dt) => Some(*dt),
        Value::Str(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            DEFAULT_DATETIME_PATTERNS
                .iter()
                .find_map(|pattern| parse_datetime_text(trimmed, pattern))
        }
        other => numeric_epoch(other),
    }
}

/// Convert to a datetime, parsing text with one caller-supplied pattern.
/// Non-text input converts as [`value_to_datetime`] would.
pub fn value_to_datetime_with(value: &Value, pattern: &str) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(dt) => Some(*dt),
        Value::Str(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            parse_datetime_text(trimmed, pattern)
        }
        other => numeric_epoch(other),
    }
}

/// Convert to a calendar date: datetime rules, keeping the date part.
pub fn value_to_date(registry: &ConverterRegistry, value: &Value) -> Option<NaiveDate> {
    value_to_datetime(registry, value).map(|dt| dt.date())
}

/// Convert to a time of day: bare time text parses directly, anything
/// else goes through datetime rules and keeps the clock part.
pub fn value_to_time(registry: &ConverterRegistry, value: &Value) -> Option<NaiveTime> {
    if let Value::Str(s) = value {
        let trimmed = s.trim();
        for pattern in DEFAULT_TIME_PATTERNS {
            if let Ok(t) = NaiveTime::parse_from_str(trimmed, pattern) {
                return Some(t);
            }
        }
    }
    value_to_datetime(registry, value).map(|dt| dt.time())
}

/// Install the date and time converters into a registry.
pub(crate) fn register_defaults(registry: &mut ConverterRegistry) {
    registry.register::<NaiveDateTime>("NaiveDateTime", value_to_datetime);
    registry.register::<NaiveDate>("NaiveDate", value_to_date);
    registry.register::<NaiveTime>("NaiveTime", value_to_time);
}
