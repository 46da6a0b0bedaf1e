//! Custom template filters
//!
//! - `default`: fallback for undefined or none values
//! - `required`: fail if the value is undefined
//! - `base64_encode`: encode for Secret `data` fields
//! - `quote`: emit a double-quoted, escaped YAML scalar

use base64::{engine::general_purpose::STANDARD, Engine};
use minijinja::{Error, ErrorKind, Value};

/// Default filter - returns fallback if value is undefined or none
///
/// Usage: `${value | default("fallback")}`
pub fn default_filter(value: Value, fallback: Value) -> Value {
    if value.is_undefined() || value.is_none() {
        fallback
    } else {
        value
    }
}

/// Required filter - fails if value is undefined
///
/// Usage: `${value | required}`
pub fn required(value: Value) -> Result<Value, Error> {
    if value.is_undefined() {
        Err(Error::new(
            ErrorKind::UndefinedError,
            "required value is undefined",
        ))
    } else {
        Ok(value)
    }
}

/// Base64 encode filter
///
/// Usage: `${value | base64_encode}`
pub fn base64_encode(value: &str) -> String {
    STANDARD.encode(value.as_bytes())
}

/// Quote filter - JSON string escaping, which is also a valid YAML scalar
///
/// Usage: `name: ${value | quote}`
pub fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_keeps_defined_values() {
        let result = default_filter(Value::from("uss1"), Value::from("fallback"));
        assert_eq!(result.to_string(), "uss1");
    }

    #[test]
    fn default_filter_replaces_undefined_and_none() {
        let result = default_filter(Value::UNDEFINED, Value::from("fallback"));
        assert_eq!(result.to_string(), "fallback");

        let result = default_filter(Value::from(()), Value::from("fallback"));
        assert_eq!(result.to_string(), "fallback");
    }

    #[test]
    fn required_rejects_undefined() {
        assert!(required(Value::UNDEFINED).is_err());
        assert!(required(Value::from("set")).is_ok());
    }

    #[test]
    fn base64_encodes_secret_values() {
        assert_eq!(base64_encode("root"), "cm9vdA==");
    }

    #[test]
    fn quote_escapes_special_characters() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("a \"b\": c"), r#""a \"b\": c""#);
    }
}
