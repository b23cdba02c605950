//! Typed setting values.
//!
//! Settings are stored as text with a [`SettingType`] tag. This module is the single
//! place where that text is encoded and decoded, so callers only ever see a
//! [`SettingValue`].

use crate::{
    entities::SettingType,
    errors::{Error, Result},
};
use serde::Serialize;
use std::{fmt, str::FromStr};

/// A decoded setting value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Verbatim text
    Text(String),
    /// Boolean flag
    Bool(bool),
    /// Whole number (stored without a decimal point)
    Integer(i64),
    /// Floating point number (stored with a decimal point)
    Float(f64),
}

impl SettingValue {
    /// The type tag this value is stored under.
    #[must_use]
    pub const fn setting_type(&self) -> SettingType {
        match self {
            Self::Text(_) => SettingType::Text,
            Self::Bool(_) => SettingType::Boolean,
            Self::Integer(_) | Self::Float(_) => SettingType::Number,
        }
    }

    /// Canonical text form written to the store.
    ///
    /// Floats always carry a decimal point so they decode back as floats.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Bool(true) => "true".to_string(),
            Self::Bool(false) => "false".to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Float(f) => {
                let text = f.to_string();
                if text.contains('.') || !f.is_finite() {
                    text
                } else {
                    format!("{text}.0")
                }
            }
        }
    }

    /// Decodes stored text according to its type tag.
    ///
    /// Booleans are `true` only for a case-insensitive `"true"`. Numbers parse as
    /// floating point when the text contains a decimal point, otherwise as integers.
    ///
    /// # Errors
    /// Returns [`Error::NumberDecode`] if a number setting does not parse.
    pub fn decode(key: &str, raw: &str, setting_type: SettingType) -> Result<Self> {
        match setting_type {
            SettingType::Text => Ok(Self::Text(raw.to_string())),
            SettingType::Boolean => Ok(Self::Bool(raw.eq_ignore_ascii_case("true"))),
            SettingType::Number => decode_number(raw).ok_or_else(|| Error::NumberDecode {
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    /// Parses operator input for a setting of the given type.
    ///
    /// Stricter than [`SettingValue::decode`]: a boolean must be `true` or `false`.
    pub fn from_input(key: &str, raw: &str, setting_type: SettingType) -> Result<Self> {
        let invalid = |expected: &str| Error::InvalidSetting {
            key: key.to_string(),
            message: format!("expected {expected}, got '{raw}'"),
        };

        match setting_type {
            SettingType::Text => Ok(Self::Text(raw.to_string())),
            SettingType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                _ => Err(invalid("true or false")),
            },
            SettingType::Number => decode_number(raw).ok_or_else(|| invalid("a number")),
        }
    }

    /// Numeric view of the value, if it is a number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Text(_) | Self::Bool(_) => None,
        }
    }

    /// Boolean view of the value, if it is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text view of the value, if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn decode_number(raw: &str) -> Option<SettingValue> {
    let trimmed = raw.trim();
    if trimmed.contains('.') {
        trimmed.parse::<f64>().ok().map(SettingValue::Float)
    } else {
        trimmed.parse::<i64>().ok().map(SettingValue::Integer)
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl FromStr for SettingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "text" => Ok(Self::Text),
            "boolean" | "bool" => Ok(Self::Boolean),
            "number" => Ok(Self::Number),
            other => Err(Error::Config {
                message: format!("Unknown setting type '{other}'"),
            }),
        }
    }
}
