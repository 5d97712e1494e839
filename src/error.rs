// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the miHeater library.
//!
//! Errors are split by origin: value validation, transport communication,
//! payload parsing, and the property-level failures raised by the
//! coordinator. Property-semantics violations (unsupported property or
//! option, out-of-range value) are always detected before any transport call.

use thiserror::Error;

use crate::types::{LedBrightness, Model, Property};

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a device payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The model string has no property table.
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    /// The configured model has no address for this property.
    #[error("{property} is not supported by {model}")]
    UnsupportedProperty {
        /// The rejected property.
        property: Property,
        /// The configured model.
        model: Model,
    },

    /// The configured model cannot represent this LED brightness option.
    #[error("LED brightness {option} is not supported by {model}")]
    UnsupportedOption {
        /// The rejected option.
        option: LedBrightness,
        /// The configured model.
        model: Model,
    },

    /// The property is a sensor reading and cannot be written.
    #[error("{0} is read-only")]
    ReadOnlyProperty(Property),

    /// The batched read round trip failed; the previous snapshot is kept.
    #[error("refresh failed: {0}")]
    RefreshFailed(#[source] ProtocolError),

    /// The write round trip failed or the device rejected the value.
    #[error("failed to write {property}: {source}")]
    WriteFailed {
        /// The property being written.
        property: Property,
        /// The underlying transport error.
        #[source]
        source: ProtocolError,
    },
}

impl Error {
    /// Returns `true` if the error came from the device round trip rather
    /// than from validating the caller's input.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Protocol(_) | Self::RefreshFailed(_) | Self::WriteFailed { .. }
        )
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// The value kind does not match what the property stores.
    #[error("{property} expects a {expected} value")]
    TypeMismatch {
        /// The property being written.
        property: Property,
        /// The expected value kind.
        expected: &'static str,
    },

    /// An unknown property name was provided.
    #[error("invalid property name: {0}")]
    InvalidProperty(String),

    /// An unknown LED brightness option was provided.
    #[error("invalid LED brightness: {0}")]
    InvalidLedBrightness(String),

    /// The device token is not 32 hexadecimal characters.
    #[error("invalid device token: {0}")]
    InvalidToken(String),
}

/// Errors related to device communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Socket I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid host or socket address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A datagram did not have the expected framing.
    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    /// The packet checksum did not match its contents.
    #[error("packet checksum mismatch")]
    ChecksumMismatch,

    /// The payload could not be decrypted with the device token.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The device answered with an error object or a non-zero code.
    #[error("command rejected with code {code}: {message}")]
    CommandRejected {
        /// Device error code.
        code: i64,
        /// Device error message.
        message: String,
    },

    /// The JSON-RPC payload could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to parsing device payloads and configuration.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing.
    #[error("missing field: {0}")]
    MissingField(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 16,
            max: 28,
            actual: 30,
        };
        assert_eq!(err.to_string(), "value 30 is out of range [16, 28]");
    }

    #[test]
    fn unsupported_property_display() {
        let err = Error::UnsupportedProperty {
            property: Property::Humidity,
            model: Model::Mc2,
        };
        assert_eq!(
            err.to_string(),
            "humidity is not supported by zhimi.heater.mc2"
        );
    }

    #[test]
    fn write_failed_keeps_source() {
        use std::error::Error as _;

        let err = Error::WriteFailed {
            property: Property::Power,
            source: ProtocolError::Timeout(5000),
        };
        assert!(err.source().is_some());
        assert!(err.is_transport());
    }

    #[test]
    fn validation_errors_are_not_transport() {
        let err: Error = ValueError::InvalidProperty("fan_speed".to_string()).into();
        assert!(!err.is_transport());
        assert!(!Error::ReadOnlyProperty(Property::Humidity).is_transport());
    }
}
