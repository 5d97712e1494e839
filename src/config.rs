// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-heater configuration.
//!
//! A [`HeaterConfig`] holds everything needed to reach one heater: address,
//! token, model string, plus timing parameters. It deserializes from the
//! JSON a host application stores, with durations given in whole seconds.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coordinator::PropertyCoordinator;
use crate::driver::DEFAULT_POLL_INTERVAL;
use crate::error::{Error, ParseError, Result, ValueError};
use crate::protocol::packet::Token;
use crate::protocol::{MiioClient, MiioConfig};
use crate::types::Model;

/// Default display name.
pub const DEFAULT_NAME: &str = "Xiaomi Heater";

/// Configuration of one heater.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use miheater_lib::config::HeaterConfig;
/// use miheater_lib::Model;
///
/// let config = HeaterConfig::new(
///     "192.168.1.40",
///     "00112233445566778899aabbccddeeff",
///     "zhimi.heater.za2",
/// )
/// .with_name("Bedroom")
/// .with_poll_interval(Duration::from_secs(60));
///
/// assert_eq!(config.validate().unwrap(), Model::Za2);
///
/// let json = r#"{
///     "host": "192.168.1.41",
///     "token": "00112233445566778899aabbccddeeff",
///     "model": "zhimi.heater.mc2",
///     "timeout": 3
/// }"#;
/// let config = HeaterConfig::from_json(json).unwrap();
/// assert_eq!(config.name, "Xiaomi Heater");
/// assert_eq!(config.timeout, Duration::from_secs(3));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaterConfig {
    /// Host name or IP address.
    pub host: String,
    /// 32 hex character device token.
    pub token: String,
    /// Model identifier, e.g. `zhimi.heater.mc2`.
    pub model: String,
    /// Display name.
    #[serde(default = "default_name")]
    pub name: String,
    /// MiIO UDP port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Round-trip timeout.
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,
    /// Interval between periodic refreshes.
    #[serde(default = "default_poll_interval", with = "duration_secs")]
    pub poll_interval: Duration,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_port() -> u16 {
    MiioConfig::DEFAULT_PORT
}

fn default_timeout() -> Duration {
    MiioConfig::DEFAULT_TIMEOUT
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

impl HeaterConfig {
    /// Creates a configuration with default name, port and timings.
    #[must_use]
    pub fn new(host: impl Into<String>, token: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
            model: model.into(),
            name: default_name(),
            port: default_port(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the document is malformed or lacks a
    /// required field.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Parse(ParseError::Json(e)))
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the round-trip timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the polling interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Checks the configuration and returns the parsed model.
    ///
    /// # Errors
    ///
    /// - `ParseError::MissingField` if the host is empty
    /// - `Error::UnsupportedModel` for an unknown model string
    /// - `ValueError::InvalidToken` for a malformed token
    /// - `ValueError::OutOfRange` for a zero timeout or polling interval
    pub fn validate(&self) -> Result<Model> {
        if self.host.trim().is_empty() {
            return Err(ParseError::MissingField("host".to_string()).into());
        }
        let model: Model = self.model.parse()?;
        Token::from_hex(&self.token)?;

        for duration in [self.timeout, self.poll_interval] {
            if duration.is_zero() {
                return Err(ValueError::OutOfRange {
                    min: 1,
                    max: i64::MAX,
                    actual: 0,
                }
                .into());
            }
        }

        Ok(model)
    }

    /// Returns the transport configuration.
    #[must_use]
    pub fn miio_config(&self) -> MiioConfig {
        MiioConfig::new(self.host.clone(), self.token.clone())
            .with_port(self.port)
            .with_timeout(self.timeout)
    }

    /// Validates the configuration and builds a coordinator for it.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`validate`](Self::validate), or a protocol
    /// error if the host cannot be resolved.
    pub async fn into_coordinator(self) -> Result<PropertyCoordinator<MiioClient>> {
        let model = self.validate()?;
        let client = self.miio_config().connect().await?;

        tracing::debug!(
            name = %self.name,
            host = %self.host,
            model = %model,
            "Created heater coordinator"
        );

        Ok(PropertyCoordinator::new(model, client))
    }
}

impl fmt::Debug for HeaterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaterConfig")
            .field("host", &self.host)
            .field("model", &self.model)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
