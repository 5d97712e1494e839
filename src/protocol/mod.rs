// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport layer for talking to heaters.
//!
//! The coordinator depends only on the [`DeviceClient`] trait: one batched
//! property read and one single-property write per round trip. Any transport
//! that can do both can drive a coordinator.
//!
//! # Transports
//!
//! - [`MiioClient`]: the encrypted MiIO UDP protocol spoken by the devices
//!   (feature `miio`, enabled by default)

#[cfg(feature = "miio")]
mod miio;
#[cfg(test)]
pub(crate) mod mock;
#[cfg(feature = "miio")]
pub mod packet;

#[cfg(feature = "miio")]
pub use miio::{MiioClient, MiioConfig};

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ProtocolError;
use crate::types::{Address, RawValue};

/// One entry of a batched read (or write acknowledgement).
///
/// `code == Some(0)` means the device served this address. Any other code,
/// or no code at all, is a per-property failure, e.g. because the firmware
/// lacks the property. A value of a shape no property uses (an array or an
/// object) decodes as `None` instead of failing the whole batch.
///
/// # Examples
///
/// ```
/// use miheater_lib::protocol::PropertyReading;
/// use miheater_lib::types::{Address, RawValue};
///
/// let ok = PropertyReading::ok(Address::new(2, 1), RawValue::Bool(true));
/// assert!(ok.is_success());
///
/// let failed = PropertyReading::failed(Address::new(5, 7), -4003);
/// assert!(!failed.is_success());
/// assert!(failed.value.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyReading {
    /// Service id.
    pub siid: u32,
    /// Property id.
    pub piid: u32,
    /// Per-property status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// The value, present on success.
    #[serde(
        default,
        deserialize_with = "scalar_or_unknown",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<RawValue>,
}

impl PropertyReading {
    /// Creates a successful reading.
    #[must_use]
    pub fn ok(address: Address, value: RawValue) -> Self {
        Self {
            siid: address.siid,
            piid: address.piid,
            code: Some(0),
            value: Some(value),
        }
    }

    /// Creates a failed reading with a device error code.
    #[must_use]
    pub fn failed(address: Address, code: i64) -> Self {
        Self {
            siid: address.siid,
            piid: address.piid,
            code: Some(code),
            value: None,
        }
    }

    /// Returns the address this entry answers.
    #[must_use]
    pub fn address(&self) -> Address {
        Address::new(self.siid, self.piid)
    }

    /// Returns `true` if the device served the property.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

fn scalar_or_unknown<'de, D>(deserializer: D) -> Result<Option<RawValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// A request/response transport to one physical device.
///
/// Both operations are single round trips. Implementations report
/// transport-level failures (socket errors, timeouts, undecodable replies)
/// as `Err`; per-property failures of a read are reported inside the
/// returned entries. Timeouts are the implementation's responsibility.
///
/// Callers must not issue two calls concurrently on the same handle.
pub trait DeviceClient: Send + Sync {
    /// Reads a set of properties in one round trip.
    ///
    /// Returns one entry per address the device answered; order is not
    /// significant.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the round trip itself fails.
    fn read(
        &self,
        addresses: &[Address],
    ) -> impl Future<Output = Result<Vec<PropertyReading>, ProtocolError>> + Send;

    /// Writes one property.
    ///
    /// Returns `Ok(false)` if the device answered but did not accept the
    /// value.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the round trip itself fails.
    fn write(
        &self,
        address: Address,
        value: RawValue,
    ) -> impl Future<Output = Result<bool, ProtocolError>> + Send;
}

impl<T: DeviceClient> DeviceClient for Arc<T> {
    fn read(
        &self,
        addresses: &[Address],
    ) -> impl Future<Output = Result<Vec<PropertyReading>, ProtocolError>> + Send {
        (**self).read(addresses)
    }

    fn write(
        &self,
        address: Address,
        value: RawValue,
    ) -> impl Future<Output = Result<bool, ProtocolError>> + Send {
        (**self).write(address, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_deserializes_device_entry() {
        let reading: PropertyReading = serde_json::from_str(
            r#"{"did":"heater","siid":2,"piid":5,"code":0,"value":22}"#,
        )
        .unwrap();
        assert_eq!(reading, PropertyReading::ok(Address::new(2, 5), RawValue::Int(22)));
    }

    #[test]
    fn failed_reading_has_no_value() {
        let reading: PropertyReading =
            serde_json::from_str(r#"{"siid":5,"piid":7,"code":-4003}"#).unwrap();
        assert!(!reading.is_success());
        assert_eq!(reading.address(), Address::new(5, 7));
        assert_eq!(reading.value, None);
    }

    #[test]
    fn reading_without_code_is_not_success() {
        let reading: PropertyReading =
            serde_json::from_str(r#"{"siid":2,"piid":1,"value":true}"#).unwrap();
        assert_eq!(reading.code, None);
        assert!(!reading.is_success());
    }

    #[test]
    fn non_scalar_value_reads_as_unknown() {
        let readings: Vec<PropertyReading> = serde_json::from_str(
            r#"[{"siid":2,"piid":1,"code":0,"value":true},
                {"siid":5,"piid":7,"code":0,"value":[1,2]},
                {"siid":5,"piid":8,"code":0,"value":{"t":19}},
                {"siid":2,"piid":5,"code":0,"value":null}]"#,
        )
        .unwrap();
        assert_eq!(readings.len(), 4);
        assert_eq!(readings[0].value, Some(RawValue::Bool(true)));
        assert!(readings[1..].iter().all(|r| r.value.is_none()));
    }

    #[test]
    fn unknown_entries_leave_snapshot_fields_empty() {
        let readings: Vec<PropertyReading> = serde_json::from_str(
            r#"[{"siid":2,"piid":2,"value":true},
                {"siid":5,"piid":7,"code":0,"value":[40]},
                {"siid":2,"piid":6,"code":0,"value":22}]"#,
        )
        .unwrap();
        let snapshot = crate::coordinator::Snapshot::decode(
            crate::types::Model::Za2,
            &readings,
            chrono::Utc::now(),
        );
        assert_eq!(snapshot.power, None);
        assert_eq!(snapshot.humidity, None);
        assert_eq!(snapshot.target_temperature, Some(22));
    }
}
