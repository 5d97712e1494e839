// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-model property tables and numeric limits.
//!
//! Each supported model stores the same logical properties at different MIoT
//! addresses, and some models lack some properties entirely. This module is
//! pure data: a [`PropertySpec`] per model mapping every stored property to
//! its address (or `None` when unsupported) and a [`ModelLimits`] per model
//! with the accepted temperature and shutoff-timer ranges.
//!
//! Adding a model means adding a [`Model`] variant and one entry in each
//! table; the coordinator only ever consumes these tables.

use crate::codec::countdown_hours_to_seconds;
use crate::error::ValueError;
use crate::types::{Address, Model, Property};

/// Where each abstract property lives for one model.
///
/// # Examples
///
/// ```
/// use miheater_lib::{Model, Property, PropertySpec};
///
/// let spec = PropertySpec::for_model(Model::Zb1);
/// assert!(spec.supports(Property::Humidity));
/// assert!(!spec.supports(Property::ChildLock));
///
/// // The derived delay-off timer shares the countdown address.
/// assert_eq!(
///     spec.address(Property::DelayOff),
///     spec.address(Property::CountdownTime),
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySpec {
    /// Heating on/off.
    pub power: Option<Address>,
    /// Target temperature.
    pub target_temperature: Option<Address>,
    /// Measured temperature.
    pub current_temperature: Option<Address>,
    /// Measured humidity.
    pub humidity: Option<Address>,
    /// Child lock.
    pub child_lock: Option<Address>,
    /// Buzzer.
    pub buzzer: Option<Address>,
    /// LED brightness.
    pub led_brightness: Option<Address>,
    /// Shutoff timer, in hours.
    pub countdown_time: Option<Address>,
}

const fn at(siid: u32, piid: u32) -> Option<Address> {
    Some(Address::new(siid, piid))
}

const MC2_PROPERTIES: PropertySpec = PropertySpec {
    power: at(2, 1),
    target_temperature: at(2, 5),
    current_temperature: at(4, 7),
    humidity: None,
    child_lock: at(5, 1),
    buzzer: at(6, 1),
    led_brightness: at(7, 3),
    countdown_time: at(3, 1),
};

const ZA2_PROPERTIES: PropertySpec = PropertySpec {
    power: at(2, 2),
    target_temperature: at(2, 6),
    current_temperature: at(5, 8),
    humidity: at(5, 7),
    child_lock: at(7, 1),
    buzzer: at(3, 1),
    led_brightness: at(6, 1),
    countdown_time: at(4, 1),
};

const ZB1_PROPERTIES: PropertySpec = PropertySpec {
    power: at(2, 2),
    target_temperature: at(2, 6),
    current_temperature: at(5, 8),
    humidity: at(5, 7),
    child_lock: None,
    buzzer: None,
    led_brightness: None,
    countdown_time: None,
};

const BS1S_PROPERTIES: PropertySpec = PropertySpec {
    power: at(2, 1),
    target_temperature: at(2, 3),
    current_temperature: at(4, 7),
    humidity: None,
    child_lock: at(5, 1),
    buzzer: at(6, 1),
    led_brightness: at(7, 1),
    countdown_time: at(3, 1),
};

impl PropertySpec {
    /// Properties that have their own device address, in table order.
    pub const STORED: [Property; 8] = [
        Property::Power,
        Property::TargetTemperature,
        Property::CurrentTemperature,
        Property::Humidity,
        Property::ChildLock,
        Property::Buzzer,
        Property::LedBrightness,
        Property::CountdownTime,
    ];

    /// Returns the property table of a model.
    #[must_use]
    pub fn for_model(model: Model) -> &'static Self {
        match model {
            Model::Mc2 | Model::Mc2a => &MC2_PROPERTIES,
            Model::Za2 => &ZA2_PROPERTIES,
            Model::Zb1 => &ZB1_PROPERTIES,
            Model::Bs1s => &BS1S_PROPERTIES,
        }
    }

    /// Returns the device address of a property, or `None` if this model
    /// does not have it.
    #[must_use]
    pub const fn address(&self, property: Property) -> Option<Address> {
        match property {
            Property::Power => self.power,
            Property::TargetTemperature => self.target_temperature,
            Property::CurrentTemperature => self.current_temperature,
            Property::Humidity => self.humidity,
            Property::ChildLock => self.child_lock,
            Property::Buzzer => self.buzzer,
            Property::LedBrightness => self.led_brightness,
            Property::CountdownTime | Property::DelayOff => self.countdown_time,
        }
    }

    /// Returns whether this model supports a property.
    #[must_use]
    pub const fn supports(&self, property: Property) -> bool {
        self.address(property).is_some()
    }

    /// Iterates over the supported properties that have their own address.
    ///
    /// This is the set a batched read requests; unsupported properties are
    /// skipped.
    pub fn readable(&self) -> impl Iterator<Item = (Property, Address)> + '_ {
        Self::STORED
            .into_iter()
            .filter_map(|property| self.address(property).map(|addr| (property, addr)))
    }
}

/// An inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    /// Lower bound.
    pub min: i64,
    /// Upper bound.
    pub max: i64,
}

impl IntRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Returns whether `value` lies within the bounds.
    #[must_use]
    pub const fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Validates `value` against the bounds.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` carrying both bounds if `value` lies
    /// outside them.
    pub fn check(&self, value: i64) -> Result<i64, ValueError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(ValueError::OutOfRange {
                min: self.min,
                max: self.max,
                actual: value,
            })
        }
    }
}

/// Numeric limits of one model.
///
/// # Examples
///
/// ```
/// use miheater_lib::{Model, ModelLimits};
///
/// let limits = ModelLimits::for_model(Model::Za2);
/// assert_eq!(limits.temperature.min, 16);
/// assert_eq!(limits.delay_off_seconds().max, 8 * 3600);
///
/// let fallback = ModelLimits::default();
/// assert_eq!((fallback.temperature.min, fallback.temperature.max), (18, 28));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelLimits {
    /// Accepted target temperature, in °C.
    pub temperature: IntRange,
    /// Accepted shutoff timer, in hours.
    pub delay_off_hours: IntRange,
}

impl ModelLimits {
    /// Limits used when no model-specific entry applies.
    pub const DEFAULT: Self = Self {
        temperature: IntRange::new(18, 28),
        delay_off_hours: IntRange::new(0, 12),
    };

    const COMPACT: Self = Self {
        temperature: IntRange::new(16, 28),
        delay_off_hours: IntRange::new(0, 8),
    };

    /// Returns the limits of a model.
    #[must_use]
    pub const fn for_model(model: Model) -> Self {
        match model {
            Model::Mc2 | Model::Mc2a | Model::Bs1s => Self::DEFAULT,
            Model::Za2 | Model::Zb1 => Self::COMPACT,
        }
    }

    /// Returns the shutoff timer range converted to seconds.
    #[must_use]
    pub fn delay_off_seconds(&self) -> IntRange {
        IntRange::new(
            countdown_hours_to_seconds(self.delay_off_hours.min),
            countdown_hours_to_seconds(self.delay_off_hours.max),
        )
    }
}

impl Default for ModelLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_ordered_for_every_model() {
        for model in Model::ALL {
            let limits = ModelLimits::for_model(model);
            assert!(limits.temperature.min <= limits.temperature.max, "{model}");
            assert!(
                limits.delay_off_hours.min <= limits.delay_off_hours.max,
                "{model}"
            );
        }
    }

    #[test]
    fn every_model_has_core_properties() {
        for model in Model::ALL {
            let spec = PropertySpec::for_model(model);
            assert!(spec.supports(Property::Power), "{model}");
            assert!(spec.supports(Property::TargetTemperature), "{model}");
            assert!(spec.supports(Property::CurrentTemperature), "{model}");
        }
    }

    #[test]
    fn zb1_lacks_controls() {
        let spec = PropertySpec::for_model(Model::Zb1);
        for property in [
            Property::ChildLock,
            Property::Buzzer,
            Property::LedBrightness,
            Property::CountdownTime,
            Property::DelayOff,
        ] {
            assert!(!spec.supports(property), "{property}");
        }
    }

    #[test]
    fn mc2_variants_share_table() {
        assert_eq!(
            PropertySpec::for_model(Model::Mc2),
            PropertySpec::for_model(Model::Mc2a)
        );
    }

    #[test]
    fn bs1s_addresses() {
        let spec = PropertySpec::for_model(Model::Bs1s);
        assert_eq!(
            spec.address(Property::TargetTemperature),
            Some(Address::new(2, 3))
        );
        assert_eq!(
            spec.address(Property::LedBrightness),
            Some(Address::new(7, 1))
        );
    }

    #[test]
    fn readable_skips_unsupported() {
        let spec = PropertySpec::for_model(Model::Zb1);
        let props: Vec<Property> = spec.readable().map(|(p, _)| p).collect();
        assert_eq!(
            props,
            vec![
                Property::Power,
                Property::TargetTemperature,
                Property::CurrentTemperature,
                Property::Humidity,
            ]
        );

        assert_eq!(PropertySpec::for_model(Model::Za2).readable().count(), 8);
        assert_eq!(PropertySpec::for_model(Model::Mc2).readable().count(), 7);
    }

    #[test]
    fn range_check_is_inclusive() {
        let range = IntRange::new(16, 28);
        assert_eq!(range.check(16), Ok(16));
        assert_eq!(range.check(28), Ok(28));
        assert_eq!(
            range.check(29),
            Err(ValueError::OutOfRange {
                min: 16,
                max: 28,
                actual: 29
            })
        );
    }

    #[test]
    fn per_model_limits() {
        assert_eq!(ModelLimits::for_model(Model::Mc2), ModelLimits::DEFAULT);
        assert_eq!(
            ModelLimits::for_model(Model::Zb1).temperature,
            IntRange::new(16, 28)
        );
        assert_eq!(
            ModelLimits::for_model(Model::Bs1s).delay_off_seconds(),
            IntRange::new(0, 43_200)
        );
    }
}
