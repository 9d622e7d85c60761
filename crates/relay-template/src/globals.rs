//! Global functions for Relay templates

use chrono::{DateTime, Local, Utc};
use minijinja::value::Value;
use minijinja::{Error, ErrorKind};
use std::convert::TryFrom;

/// Helper to convert Value to f64
fn value_to_f64(value: &Value) -> Option<f64> {
    f64::try_from(value.clone())
        .ok()
        .or_else(|| value.as_i64().map(|i| i as f64))
}

// ==================== Time Functions ====================

/// Get the current local time as an RFC 3339 string
pub fn now() -> Value {
    Value::from(Local::now().to_rfc3339())
}

/// Get the current UTC time as an RFC 3339 string
pub fn utcnow() -> Value {
    Value::from(Utc::now().to_rfc3339())
}

/// Convert a datetime string or number to a UNIX timestamp
pub fn as_timestamp(value: Value) -> Result<f64, Error> {
    if let Some(s) = value.as_str() {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.timestamp() as f64);
        }
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(dt.and_utc().timestamp() as f64);
        }
        if let Ok(ts) = s.parse::<f64>() {
            return Ok(ts);
        }
    }

    if let Some(f) = value_to_f64(&value) {
        return Ok(f);
    }

    Err(Error::new(
        ErrorKind::InvalidOperation,
        "cannot convert to timestamp",
    ))
}

// ==================== Utility Functions ====================

/// Immediate if: `iif(condition, if_true, if_false)`
pub fn iif(condition: Value, if_true: Value, if_false: Option<Value>) -> Value {
    if condition.is_true() {
        if_true
    } else {
        if_false.unwrap_or(Value::UNDEFINED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_timestamp_rfc3339() {
        let ts = as_timestamp(Value::from("1970-01-01T00:01:00+00:00")).unwrap();
        assert_eq!(ts, 60.0);
    }

    #[test]
    fn test_as_timestamp_numeric() {
        assert_eq!(as_timestamp(Value::from(42)).unwrap(), 42.0);
        assert_eq!(as_timestamp(Value::from("42.5")).unwrap(), 42.5);
        assert!(as_timestamp(Value::from(())).is_err());
    }

    #[test]
    fn test_iif() {
        assert_eq!(
            iif(Value::from(true), Value::from("a"), Some(Value::from("b"))),
            Value::from("a")
        );
        assert_eq!(
            iif(Value::from(false), Value::from("a"), Some(Value::from("b"))),
            Value::from("b")
        );
    }
}
