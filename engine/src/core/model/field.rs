//! Generic Field Values
//!
//! Tagged values used by the field-keyed accessors of subtitles and styles,
//! and captured by the commands that undo field edits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{CoreError, CoreResult};

/// Value of one subtitle or style field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    Text(String),
}

impl FieldValue {
    /// Integer view; text is parsed, decimals must be whole.
    pub fn as_integer(&self, field: &str) -> CoreResult<i64> {
        match self {
            FieldValue::Integer(value) => Ok(*value),
            FieldValue::Bool(value) => Ok(i64::from(*value)),
            FieldValue::Decimal(value) if value.fract() == 0.0 => Ok(*value as i64),
            FieldValue::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| CoreError::invalid_value(field, format!("not an integer: {text:?}"))),
            other => Err(CoreError::invalid_value(
                field,
                format!("not an integer: {other}"),
            )),
        }
    }

    pub fn as_decimal(&self, field: &str) -> CoreResult<f64> {
        match self {
            FieldValue::Integer(value) => Ok(*value as f64),
            FieldValue::Decimal(value) => Ok(*value),
            FieldValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| CoreError::invalid_value(field, format!("not a number: {text:?}"))),
            FieldValue::Bool(_) => Err(CoreError::invalid_value(field, "not a number: bool")),
        }
    }

    /// Boolean view; accepts `0`/`1`, `-1` (ASS true) and `true`/`false`.
    pub fn as_bool(&self, field: &str) -> CoreResult<bool> {
        match self {
            FieldValue::Bool(value) => Ok(*value),
            FieldValue::Integer(value) => Ok(*value != 0),
            FieldValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "1" | "-1" | "true" | "yes" => Ok(true),
                "0" | "false" | "no" => Ok(false),
                _ => Err(CoreError::invalid_value(
                    field,
                    format!("not a boolean: {text:?}"),
                )),
            },
            FieldValue::Decimal(_) => Err(CoreError::invalid_value(field, "not a boolean: decimal")),
        }
    }

    /// Text view; every variant has one.
    pub fn into_text(self) -> String {
        match self {
            FieldValue::Text(text) => text,
            other => other.to_string(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Decimal(value) => write!(f, "{value}"),
            FieldValue::Bool(value) => write!(f, "{value}"),
            FieldValue::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}
