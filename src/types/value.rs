// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw device values and semantic property values.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::LedBrightness;

/// A value as it travels on the wire.
///
/// MIoT devices answer with plain JSON scalars; which kind a property uses
/// depends on the firmware, so decoding is lenient (a boolean property may
/// come back as `0`/`1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// JSON boolean.
    Bool(bool),
    /// JSON integer.
    Int(i64),
    /// JSON number with a fractional part.
    Float(f64),
    /// JSON string.
    Text(String),
}

impl RawValue {
    /// Interprets the value as a boolean (non-zero integers are `true`).
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(n) => Some(*n != 0),
            Self::Float(_) | Self::Text(_) => None,
        }
    }

    /// Interprets the value as an integer.
    ///
    /// Floats are accepted only when they carry no fractional part.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Bool(b) => Some(i64::from(*b)),
            // Safe: only whole numbers reach the cast
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Self::Float(_) | Self::Text(_) => None,
        }
    }

    /// Interprets the value as a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(n) => Some(*n as f64),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// A decoded property value.
///
/// This is what [`Snapshot::get`](crate::coordinator::Snapshot::get) returns
/// and what [`PropertyCoordinator::set`](crate::coordinator::PropertyCoordinator::set)
/// accepts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Switch-like properties.
    Bool(bool),
    /// Temperatures, humidity, timers.
    Int(i64),
    /// Measured temperature.
    Float(f64),
    /// LED brightness option.
    Led(LedBrightness),
}

impl PropertyValue {
    /// Returns the boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the LED option, if this is one.
    #[must_use]
    pub fn as_led(&self) -> Option<LedBrightness> {
        match self {
            Self::Led(led) => Some(*led),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<LedBrightness> for PropertyValue {
    fn from(value: LedBrightness) -> Self {
        Self::Led(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_value_deserializes_json_scalars() {
        let values: Vec<RawValue> = serde_json::from_str(r#"[true, 3, 21.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                RawValue::Bool(true),
                RawValue::Int(3),
                RawValue::Float(21.5),
                RawValue::Text("x".to_string()),
            ]
        );
    }

    #[test]
    fn raw_value_lenient_bool() {
        assert_eq!(RawValue::Int(1).as_bool(), Some(true));
        assert_eq!(RawValue::Int(0).as_bool(), Some(false));
        assert_eq!(RawValue::Text("on".to_string()).as_bool(), None);
    }

    #[test]
    fn raw_value_int_rejects_fractions() {
        assert_eq!(RawValue::Float(22.0).as_int(), Some(22));
        assert_eq!(RawValue::Float(22.5).as_int(), None);
    }

    #[test]
    fn raw_value_serializes_bare() {
        assert_eq!(serde_json::to_string(&RawValue::Int(8)).unwrap(), "8");
        assert_eq!(serde_json::to_string(&RawValue::Bool(false)).unwrap(), "false");
    }

    #[test]
    fn property_value_accessors() {
        assert_eq!(PropertyValue::from(true).as_bool(), Some(true));
        assert_eq!(PropertyValue::from(21_i64).as_int(), Some(21));
        assert_eq!(PropertyValue::from(true).as_int(), None);
        assert_eq!(
            PropertyValue::from(LedBrightness::Dim).as_led(),
            Some(LedBrightness::Dim)
        );
    }
}
