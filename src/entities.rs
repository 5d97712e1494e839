// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Presentation entities a heater model offers.
//!
//! Host integrations render a heater as several entities: a climate control,
//! a humidity sensor, a few switches and so on. Which ones make sense depends
//! only on the model's property table, so the set is derived here once and
//! every adapter reads from the same coordinator.

use crate::capabilities::{ModelLimits, PropertySpec};
use crate::codec::LedCodec;
use crate::types::{LedBrightness, Model, Property};

/// One presentation entity and the parameters it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Thermostat: power, target and current temperature.
    Climate {
        /// Lowest settable target, °C.
        min_temperature: i64,
        /// Highest settable target, °C.
        max_temperature: i64,
    },
    /// Relative humidity sensor.
    HumiditySensor,
    /// Child lock switch.
    ChildLockSwitch,
    /// Buzzer switch.
    BuzzerSwitch,
    /// Display brightness selector.
    LedBrightnessSelect {
        /// Selectable options.
        options: &'static [LedBrightness],
    },
    /// Shutoff timer, entered in hours.
    DelayOffNumber {
        /// Lowest value, hours.
        min_hours: i64,
        /// Highest value, hours.
        max_hours: i64,
    },
}

impl EntityKind {
    /// Returns a stable key, suitable for building unique ids.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Climate { .. } => "climate",
            Self::HumiditySensor => "humidity",
            Self::ChildLockSwitch => "child_lock",
            Self::BuzzerSwitch => "buzzer",
            Self::LedBrightnessSelect { .. } => "led_brightness",
            Self::DelayOffNumber { .. } => "delay_off",
        }
    }

    /// Returns the properties the entity reads or writes.
    #[must_use]
    pub const fn properties(&self) -> &'static [Property] {
        match self {
            Self::Climate { .. } => &[
                Property::Power,
                Property::TargetTemperature,
                Property::CurrentTemperature,
            ],
            Self::HumiditySensor => &[Property::Humidity],
            Self::ChildLockSwitch => &[Property::ChildLock],
            Self::BuzzerSwitch => &[Property::Buzzer],
            Self::LedBrightnessSelect { .. } => &[Property::LedBrightness],
            Self::DelayOffNumber { .. } => &[Property::DelayOff],
        }
    }

    /// Builds the unique id of this entity on a given device, e.g.
    /// `"04cf8c123456_child_lock"`.
    #[must_use]
    pub fn unique_id(&self, device: &str) -> String {
        format!("{device}_{}", self.key())
    }
}

/// The entities supported by one model.
///
/// # Examples
///
/// ```
/// use miheater_lib::entities::{EntityKind, EntitySet};
/// use miheater_lib::Model;
///
/// let set = EntitySet::for_model(Model::Zb1);
/// assert_eq!(set.len(), 2);
/// assert!(set.contains("humidity"));
/// assert!(!set.contains("child_lock"));
///
/// let set = EntitySet::for_model(Model::Za2);
/// match set.get("led_brightness") {
///     Some(EntityKind::LedBrightnessSelect { options }) => assert_eq!(options.len(), 3),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySet {
    model: Model,
    entities: Vec<EntityKind>,
}

impl EntitySet {
    /// Derives the entity set of a model from its property table.
    #[must_use]
    pub fn for_model(model: Model) -> Self {
        let spec = PropertySpec::for_model(model);
        let limits = ModelLimits::for_model(model);

        let mut entities = vec![EntityKind::Climate {
            min_temperature: limits.temperature.min,
            max_temperature: limits.temperature.max,
        }];

        if spec.supports(Property::Humidity) {
            entities.push(EntityKind::HumiditySensor);
        }
        if spec.supports(Property::ChildLock) {
            entities.push(EntityKind::ChildLockSwitch);
        }
        if spec.supports(Property::Buzzer) {
            entities.push(EntityKind::BuzzerSwitch);
        }
        if spec.supports(Property::LedBrightness) {
            entities.push(EntityKind::LedBrightnessSelect {
                options: LedCodec::for_model(model).supported_options(),
            });
        }
        if spec.supports(Property::DelayOff) {
            entities.push(EntityKind::DelayOffNumber {
                min_hours: limits.delay_off_hours.min,
                max_hours: limits.delay_off_hours.max,
            });
        }

        Self { model, entities }
    }

    /// Returns the model.
    #[must_use]
    pub fn model(&self) -> Model {
        self.model
    }

    /// Returns the entity with the given key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&EntityKind> {
        self.entities.iter().find(|e| e.key() == key)
    }

    /// Returns whether the model offers the entity with the given key.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over the entities.
    pub fn iter(&self) -> std::slice::Iter<'_, EntityKind> {
        self.entities.iter()
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Always `false`; every model has a climate entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<'a> IntoIterator for &'a EntitySet {
    type Item = &'a EntityKind;
    type IntoIter = std::slice::Iter<'a, EntityKind>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
