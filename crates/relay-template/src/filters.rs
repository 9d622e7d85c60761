//! Custom Jinja2 filters for Relay templates
//!
//! These filters extend minijinja with the coercions Relay configs rely on.

use minijinja::value::{Kwargs, Value};
use minijinja::{Error, ErrorKind};
use regex::Regex;
use std::convert::TryFrom;

/// Helper to convert Value to f64
fn value_to_f64(value: &Value) -> Option<f64> {
    f64::try_from(value.clone())
        .ok()
        .or_else(|| value.as_i64().map(|i| i as f64))
}

// ==================== String Filters ====================

/// Convert a string to a slug
pub fn slugify(value: &str, kwargs: Kwargs) -> Result<String, Error> {
    let separator: String = kwargs
        .get::<Option<String>>("separator")?
        .unwrap_or_else(|| "_".to_string());
    Ok(slug::slugify(value).replace('-', &separator))
}

/// Replace matches of a regex pattern with a replacement string
pub fn regex_replace(value: &str, find: &str, replace: &str) -> Result<String, Error> {
    let re = Regex::new(find)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, format!("invalid regex: {}", e)))?;
    Ok(re.replace_all(value, replace).to_string())
}

// ==================== Type Conversion Filters ====================

/// Convert value to float with optional default
pub fn to_float(value: Value, default: Option<Value>) -> Result<Value, Error> {
    let result = if let Some(f) = value_to_f64(&value) {
        Some(f)
    } else if let Some(s) = value.as_str() {
        s.trim().parse::<f64>().ok()
    } else {
        None
    };

    match result {
        Some(f) => Ok(Value::from(f)),
        None => match default.as_ref().and_then(value_to_f64) {
            Some(f) => Ok(Value::from(f)),
            None => Err(Error::new(
                ErrorKind::InvalidOperation,
                "cannot convert to float",
            )),
        },
    }
}

/// Convert value to integer with optional default
pub fn to_int(value: Value, default: Option<Value>) -> Result<Value, Error> {
    let result = if let Some(i) = value.as_i64() {
        Some(i)
    } else if let Some(f) = value_to_f64(&value) {
        Some(f as i64)
    } else if let Some(s) = value.as_str() {
        // Integer first, then float with truncation
        s.trim()
            .parse::<i64>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().map(|f| f as i64))
    } else {
        None
    };

    match result {
        Some(i) => Ok(Value::from(i)),
        None => match default.as_ref().and_then(|d| d.as_i64()) {
            Some(i) => Ok(Value::from(i)),
            None => Err(Error::new(
                ErrorKind::InvalidOperation,
                "cannot convert to int",
            )),
        },
    }
}

/// Convert value to boolean
///
/// Strings follow config conventions: "true"/"yes"/"on"/"enable" (and "1")
/// are true, "false"/"no"/"off"/"disable" (and "0") are false.
pub fn to_bool(value: Value, default: Option<Value>) -> Result<Value, Error> {
    if let Ok(b) = bool::try_from(value.clone()) {
        return Ok(Value::from(b));
    }

    let result = if let Some(s) = value.as_str() {
        match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "enable" | "1" => Some(true),
            "false" | "no" | "off" | "disable" | "0" => Some(false),
            _ => None,
        }
    } else {
        value_to_f64(&value).map(|f| f != 0.0)
    };

    match result {
        Some(b) => Ok(Value::from(b)),
        None => match default {
            Some(d) => Ok(Value::from(d.is_true())),
            None => Err(Error::new(
                ErrorKind::InvalidOperation,
                "cannot convert to bool",
            )),
        },
    }
}

// ==================== Type Checks ====================

/// Test if a value is a number
pub fn is_number(value: Value) -> bool {
    value.as_i64().is_some() || f64::try_from(value).is_ok()
}

/// Test if a value is a string
pub fn is_string(value: Value) -> bool {
    value.as_str().is_some()
}

/// Test if a value is defined
pub fn is_defined(value: Value) -> bool {
    !value.is_undefined()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_int_from_string() {
        assert_eq!(to_int(Value::from("42"), None).unwrap(), Value::from(42));
        assert_eq!(to_int(Value::from("3.7"), None).unwrap(), Value::from(3));
        assert!(to_int(Value::from("nope"), None).is_err());
        assert_eq!(
            to_int(Value::from("nope"), Some(Value::from(7))).unwrap(),
            Value::from(7)
        );
    }

    #[test]
    fn test_to_float() {
        assert_eq!(
            to_float(Value::from("2.5"), None).unwrap(),
            Value::from(2.5)
        );
        assert_eq!(to_float(Value::from(3), None).unwrap(), Value::from(3.0));
    }

    #[test]
    fn test_to_bool_strings() {
        assert_eq!(to_bool(Value::from("on"), None).unwrap(), Value::from(true));
        assert_eq!(
            to_bool(Value::from("No"), None).unwrap(),
            Value::from(false)
        );
        assert!(to_bool(Value::from("maybe"), None).is_err());
    }

    #[test]
    fn test_regex_replace() {
        assert_eq!(
            regex_replace("hello world", "\\s+", "-").unwrap(),
            "hello-world"
        );
        assert!(regex_replace("x", "(", "-").is_err());
    }
}
