// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Abstract property names and device addresses.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// An abstract heater property, independent of the hardware model.
///
/// [`Property::DelayOff`] is derived: it is the shutoff timer expressed in
/// seconds and lives at the same device address as
/// [`Property::CountdownTime`], which the device stores in whole hours.
///
/// # Examples
///
/// ```
/// use miheater_lib::types::Property;
///
/// let prop: Property = "child_lock".parse().unwrap();
/// assert_eq!(prop, Property::ChildLock);
/// assert!(!Property::Humidity.is_writable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Heating on/off.
    Power,
    /// Target temperature in °C.
    TargetTemperature,
    /// Measured temperature in °C.
    CurrentTemperature,
    /// Measured relative humidity in %.
    Humidity,
    /// Physical buttons locked.
    ChildLock,
    /// Beep on button press.
    Buzzer,
    /// Display brightness.
    LedBrightness,
    /// Shutoff timer in hours, as stored by the device.
    CountdownTime,
    /// Shutoff timer in seconds.
    DelayOff,
}

impl Property {
    /// Every abstract property.
    pub const ALL: [Self; 9] = [
        Self::Power,
        Self::TargetTemperature,
        Self::CurrentTemperature,
        Self::Humidity,
        Self::ChildLock,
        Self::Buzzer,
        Self::LedBrightness,
        Self::CountdownTime,
        Self::DelayOff,
    ];

    /// Returns the snake_case property name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::TargetTemperature => "target_temperature",
            Self::CurrentTemperature => "current_temperature",
            Self::Humidity => "humidity",
            Self::ChildLock => "child_lock",
            Self::Buzzer => "buzzer",
            Self::LedBrightness => "led_brightness",
            Self::CountdownTime => "countdown_time",
            Self::DelayOff => "delay_off",
        }
    }

    /// Returns `false` for sensor readings.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        !matches!(self, Self::CurrentTemperature | Self::Humidity)
    }

    /// Returns `true` if the property has no address of its own.
    #[must_use]
    pub const fn is_derived(&self) -> bool {
        matches!(self, Self::DelayOff)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|prop| prop.as_str() == s)
            .ok_or_else(|| ValueError::InvalidProperty(s.to_string()))
    }
}

/// Location of a property in the MIoT protocol: service id and property id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    /// Service id (`siid`).
    pub siid: u32,
    /// Property id (`piid`).
    pub piid: u32,
}

impl Address {
    /// Creates an address.
    #[must_use]
    pub const fn new(siid: u32, piid: u32) -> Self {
        Self { siid, piid }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.siid, self.piid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trip() {
        for prop in Property::ALL {
            assert_eq!(prop.as_str().parse::<Property>().unwrap(), prop);
        }
    }

    #[test]
    fn unknown_name() {
        assert_eq!(
            "fan_level".parse::<Property>(),
            Err(ValueError::InvalidProperty("fan_level".to_string()))
        );
    }

    #[test]
    fn sensors_are_read_only() {
        assert!(!Property::CurrentTemperature.is_writable());
        assert!(!Property::Humidity.is_writable());
        assert!(Property::DelayOff.is_writable());
        assert!(Property::Power.is_writable());
    }

    #[test]
    fn address_display() {
        assert_eq!(Address::new(2, 5).to_string(), "2.5");
    }
}
