//! Lenient scalar readers for provider fields that arrive as numbers, numeric
//! strings, signed strings, booleans or not at all. None of these fail: any
//! value that does not parse degrades to zero / false / empty.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

/// Epoch values above this are milliseconds, below it seconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

pub fn parse_int_safe(value: Option<&Value>) -> i64 {
    let f = parse_float_safe(value);
    if f >= i64::MAX as f64 || f <= i64::MIN as f64 {
        return 0;
    }
    f.trunc() as i64
}

/// Non-negative counter; negatives and overflow clamp into `u32`.
pub fn parse_u32_safe(value: Option<&Value>) -> u32 {
    parse_int_safe(value).clamp(0, u32::MAX as i64) as u32
}

/// Accepts a leading `+`, which the provider emits on run rates (`"+0.689"`).
pub fn parse_float_safe(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let s = s.trim();
            let s = s.strip_prefix('+').unwrap_or(s);
            s.parse::<f64>().ok()
        }
        _ => None,
    };
    match parsed {
        Some(f) if f.is_finite() => f,
        _ => 0.0,
    }
}

pub fn parse_bool_safe(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "y"
        ),
        _ => false,
    }
}

/// Strings are trimmed; numbers are rendered (ids often arrive as integers).
pub fn parse_string_safe(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// First non-empty string among `keys`, in order.
pub fn first_string(v: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .map(|k| parse_string_safe(v.get(*k)))
        .find(|s| !s.is_empty())
}

/// Epoch seconds or millis (number or digit string), RFC 3339, or `YYYY-MM-DD`.
pub fn parse_timestamp_safe(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value {
        Some(Value::Number(n)) => n.as_i64().and_then(from_epoch),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if s.chars().all(|c| c.is_ascii_digit()) {
                return s.parse::<i64>().ok().and_then(from_epoch);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
        }
        _ => None,
    }
}

fn from_epoch(n: i64) -> Option<DateTime<Utc>> {
    if n <= 0 {
        return None;
    }
    if n >= MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}
