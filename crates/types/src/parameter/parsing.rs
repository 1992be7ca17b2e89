//! Conversion of user-supplied text and JSON into typed parameter values.
//!
//! Command-line flags arrive as strings and params files arrive as JSON; both
//! are checked against the declared [`ParameterKind`] here so that later
//! stages only ever see well-typed values.

use serde_json::Value;
use thiserror::Error;

use super::{Location, ParameterKind, ParameterValue};

/// Error raised when a supplied value does not fit the declared kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("expected {expected} value, got '{found}'")]
pub struct ValueError {
    pub expected: ParameterKind,
    pub found: String,
}

impl ValueError {
    fn new(expected: ParameterKind, found: impl Into<String>) -> Self {
        Self {
            expected,
            found: found.into(),
        }
    }
}

impl ParameterValue {
    /// Parse a command-line string as a value of `kind`.
    ///
    /// Booleans accept `true/false`, `yes/no`, and `1/0` (case-insensitive).
    pub fn parse_str(kind: ParameterKind, raw: &str) -> Result<Self, ValueError> {
        let trimmed = raw.trim();
        match kind {
            ParameterKind::File => non_empty(kind, trimmed).map(|text| ParameterValue::File(Location::parse(text))),
            ParameterKind::Directory => non_empty(kind, trimmed).map(|text| ParameterValue::Directory(Location::parse(text))),
            ParameterKind::String => Ok(ParameterValue::String(raw.to_string())),
            ParameterKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(ParameterValue::Boolean(true)),
                "false" | "no" | "0" => Ok(ParameterValue::Boolean(false)),
                _ => Err(ValueError::new(kind, raw)),
            },
            ParameterKind::Integer => trimmed
                .parse::<i64>()
                .map(ParameterValue::Integer)
                .map_err(|_| ValueError::new(kind, raw)),
            ParameterKind::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(ParameterValue::Float)
                .ok_or_else(|| ValueError::new(kind, raw)),
        }
    }

    /// Convert a JSON value as a value of `kind`.
    ///
    /// Returns `Ok(None)` for JSON `null`, which callers treat as "not
    /// supplied". Integers are accepted for float parameters; strings are
    /// accepted for every kind and parsed with [`ParameterValue::parse_str`].
    pub fn from_json(kind: ParameterKind, json: &Value) -> Result<Option<Self>, ValueError> {
        let value = match (kind, json) {
            (_, Value::Null) => return Ok(None),
            (_, Value::String(text)) => ParameterValue::parse_str(kind, text)?,
            (ParameterKind::Boolean, Value::Bool(flag)) => ParameterValue::Boolean(*flag),
            (ParameterKind::Integer, Value::Number(number)) => number
                .as_i64()
                .map(ParameterValue::Integer)
                .ok_or_else(|| ValueError::new(kind, number.to_string()))?,
            (ParameterKind::Float, Value::Number(number)) => number
                .as_f64()
                .map(ParameterValue::Float)
                .ok_or_else(|| ValueError::new(kind, number.to_string()))?,
            (_, other) => return Err(ValueError::new(kind, other.to_string())),
        };
        Ok(Some(value))
    }
}

fn non_empty(kind: ParameterKind, text: &str) -> Result<&str, ValueError> {
    if text.is_empty() { Err(ValueError::new(kind, text)) } else { Ok(text) }
}
