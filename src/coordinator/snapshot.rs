// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded property values of one heater.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::capabilities::PropertySpec;
use crate::codec::{LedCodec, countdown_hours_to_seconds};
use crate::protocol::PropertyReading;
use crate::types::{Address, LedBrightness, Model, Property, PropertyValue, RawValue};

/// The last successfully read state of a heater.
///
/// Every field is `None` until a refresh delivers it, and stays `None` when
/// the model lacks the property or the device failed to report it. A new
/// snapshot replaces the old one as a whole; fields are never merged across
/// refreshes.
///
/// # Examples
///
/// ```
/// use miheater_lib::coordinator::Snapshot;
/// use miheater_lib::{Property, PropertyValue};
///
/// let snapshot = Snapshot {
///     power: Some(true),
///     target_temperature: Some(22),
///     ..Snapshot::default()
/// };
///
/// assert_eq!(snapshot.get(Property::Power), Some(PropertyValue::Bool(true)));
/// assert_eq!(snapshot.get(Property::Humidity), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Heating on/off.
    pub power: Option<bool>,
    /// Target temperature, °C.
    pub target_temperature: Option<i64>,
    /// Measured temperature, °C.
    pub current_temperature: Option<f64>,
    /// Measured relative humidity, %.
    pub humidity: Option<i64>,
    /// Child lock engaged.
    pub child_lock: Option<bool>,
    /// Buzzer enabled.
    pub buzzer: Option<bool>,
    /// Display brightness.
    pub led_brightness: Option<LedBrightness>,
    /// Shutoff timer as stored by the device, hours.
    pub countdown_time: Option<u32>,
    /// Shutoff timer, seconds.
    pub delay_off: Option<u32>,
    /// When the values were read.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Returns a property by name.
    #[must_use]
    pub fn get(&self, property: Property) -> Option<PropertyValue> {
        match property {
            Property::Power => self.power.map(PropertyValue::Bool),
            Property::TargetTemperature => self.target_temperature.map(PropertyValue::Int),
            Property::CurrentTemperature => self.current_temperature.map(PropertyValue::Float),
            Property::Humidity => self.humidity.map(PropertyValue::Int),
            Property::ChildLock => self.child_lock.map(PropertyValue::Bool),
            Property::Buzzer => self.buzzer.map(PropertyValue::Bool),
            Property::LedBrightness => self.led_brightness.map(PropertyValue::Led),
            Property::CountdownTime => self.countdown_time.map(PropertyValue::from),
            Property::DelayOff => self.delay_off.map(PropertyValue::from),
        }
    }

    /// Returns `true` if no property is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Property::ALL.iter().all(|p| self.get(*p).is_none())
    }

    /// Builds a snapshot from the entries of one batched read.
    ///
    /// Failed entries, missing entries and values of the wrong kind all
    /// leave the field unknown.
    pub(crate) fn decode(
        model: Model,
        readings: &[PropertyReading],
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let spec = PropertySpec::for_model(model);
        let led = LedCodec::for_model(model);

        let served: HashMap<Address, &RawValue> = readings
            .iter()
            .filter(|r| r.is_success())
            .filter_map(|r| r.value.as_ref().map(|v| (r.address(), v)))
            .collect();

        let raw = |property: Property| {
            spec.address(property)
                .and_then(|addr| served.get(&addr).copied())
        };

        let countdown_time = raw(Property::CountdownTime)
            .and_then(RawValue::as_int)
            .and_then(|h| u32::try_from(h).ok());

        Self {
            power: raw(Property::Power).and_then(RawValue::as_bool),
            target_temperature: raw(Property::TargetTemperature).and_then(RawValue::as_int),
            current_temperature: raw(Property::CurrentTemperature).and_then(RawValue::as_float),
            humidity: raw(Property::Humidity).and_then(RawValue::as_int),
            child_lock: raw(Property::ChildLock).and_then(RawValue::as_bool),
            buzzer: raw(Property::Buzzer).and_then(RawValue::as_bool),
            led_brightness: raw(Property::LedBrightness)
                .and_then(RawValue::as_int)
                .map(|v| led.decode(v)),
            countdown_time,
            delay_off: countdown_time
                .and_then(|h| u32::try_from(countdown_hours_to_seconds(i64::from(h))).ok()),
            fetched_at: Some(fetched_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(siid: u32, piid: u32, value: RawValue) -> PropertyReading {
        PropertyReading::ok(Address::new(siid, piid), value)
    }

    #[test]
    fn default_is_empty() {
        let snapshot = Snapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.fetched_at, None);
    }

    #[test]
    fn decode_za2_reply() {
        let readings = vec![
            ok(2, 2, RawValue::Bool(true)),
            ok(2, 6, RawValue::Int(24)),
            ok(5, 8, RawValue::Float(19.5)),
            ok(5, 7, RawValue::Int(41)),
            ok(7, 1, RawValue::Bool(false)),
            ok(3, 1, RawValue::Bool(true)),
            ok(6, 1, RawValue::Int(1)),
            ok(4, 1, RawValue::Int(2)),
        ];

        let snapshot = Snapshot::decode(Model::Za2, &readings, Utc::now());

        assert_eq!(snapshot.power, Some(true));
        assert_eq!(snapshot.target_temperature, Some(24));
        assert_eq!(snapshot.current_temperature, Some(19.5));
        assert_eq!(snapshot.humidity, Some(41));
        assert_eq!(snapshot.child_lock, Some(false));
        assert_eq!(snapshot.buzzer, Some(true));
        assert_eq!(snapshot.led_brightness, Some(LedBrightness::Dim));
        assert_eq!(snapshot.countdown_time, Some(2));
        assert_eq!(snapshot.delay_off, Some(7200));
        assert!(snapshot.fetched_at.is_some());
    }

    #[test]
    fn failed_and_mistyped_entries_are_unknown() {
        let readings = vec![
            ok(2, 1, RawValue::Int(1)),
            PropertyReading::failed(Address::new(2, 5), -4003),
            ok(4, 7, RawValue::Text("n/a".to_string())),
        ];

        let snapshot = Snapshot::decode(Model::Mc2, &readings, Utc::now());

        assert_eq!(snapshot.power, Some(true));
        assert_eq!(snapshot.target_temperature, None);
        assert_eq!(snapshot.current_temperature, None);
        assert_eq!(snapshot.child_lock, None);
    }

    #[test]
    fn negative_countdown_is_unknown() {
        let readings = vec![ok(3, 1, RawValue::Int(-1))];
        let snapshot = Snapshot::decode(Model::Bs1s, &readings, Utc::now());
        assert_eq!(snapshot.countdown_time, None);
        assert_eq!(snapshot.delay_off, None);
    }

    #[test]
    fn get_covers_derived_timer() {
        let snapshot = Snapshot {
            countdown_time: Some(3),
            delay_off: Some(10_800),
            ..Snapshot::default()
        };
        assert_eq!(snapshot.get(Property::CountdownTime), Some(PropertyValue::Int(3)));
        assert_eq!(snapshot.get(Property::DelayOff), Some(PropertyValue::Int(10_800)));
        assert!(!snapshot.is_empty());
    }
}
