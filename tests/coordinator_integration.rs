// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the coordinator, driver and entity set through the
//! public API with a custom transport.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use miheater_lib::{
    Address, CoordinatorState, DeviceClient, EntityKind, EntitySet, Error, EventBus, HeaterEvent,
    LedBrightness, Model, PollingDriver, Property, PropertyCoordinator, PropertyReading,
    PropertySpec, PropertyValue, ProtocolError, RawValue,
};

/// A heater that answers every supported address with a fixed value.
#[derive(Default)]
struct TableDevice {
    values: Mutex<HashMap<Address, RawValue>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl TableDevice {
    fn for_model(model: Model) -> Arc<Self> {
        let device = Self::default();
        let spec = PropertySpec::for_model(model);
        let mut values = device.values.lock();
        for (property, address) in spec.readable() {
            let value = match property {
                Property::Power | Property::ChildLock | Property::Buzzer => RawValue::Bool(true),
                Property::TargetTemperature => RawValue::Int(20),
                Property::CurrentTemperature => RawValue::Float(18.5),
                Property::Humidity => RawValue::Int(40),
                Property::LedBrightness | Property::CountdownTime | Property::DelayOff => {
                    RawValue::Int(0)
                }
            };
            values.insert(address, value);
        }
        drop(values);
        Arc::new(device)
    }
}

impl DeviceClient for TableDevice {
    async fn read(&self, addresses: &[Address]) -> Result<Vec<PropertyReading>, ProtocolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ProtocolError::ConnectionFailed("unreachable".to_string()));
        }
        let values = self.values.lock();
        Ok(addresses
            .iter()
            .filter_map(|a| values.get(a).map(|v| PropertyReading::ok(*a, v.clone())))
            .collect())
    }

    async fn write(&self, address: Address, value: RawValue) -> Result<bool, ProtocolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ProtocolError::ConnectionFailed("unreachable".to_string()));
        }
        self.values.lock().insert(address, value);
        Ok(true)
    }
}

#[tokio::test]
async fn every_entity_property_is_filled_after_refresh() {
    for model in Model::ALL {
        let heater = PropertyCoordinator::new(model, TableDevice::for_model(model));
        let snapshot = heater.refresh().await.unwrap();

        for entity in &EntitySet::for_model(model) {
            for property in entity.properties() {
                assert!(
                    snapshot.get(*property).is_some(),
                    "{model}: {property} missing for {}",
                    entity.key()
                );
            }
        }
    }
}

#[tokio::test]
async fn selectable_led_options_are_writable() {
    for model in Model::ALL {
        let heater = PropertyCoordinator::new(model, TableDevice::for_model(model));
        let Some(EntityKind::LedBrightnessSelect { options }) =
            EntitySet::for_model(model).get("led_brightness").copied()
        else {
            continue;
        };

        for option in options {
            heater.set_led_brightness(*option).await.unwrap();
            let snapshot = heater.refresh().await.unwrap();
            assert_eq!(snapshot.led_brightness, Some(*option), "{model}");
        }
    }
}

#[tokio::test]
async fn delay_off_entity_range_matches_validation() {
    for model in Model::ALL {
        let Some(EntityKind::DelayOffNumber {
            min_hours,
            max_hours,
        }) = EntitySet::for_model(model).get("delay_off").copied()
        else {
            continue;
        };
        let heater = PropertyCoordinator::new(model, TableDevice::for_model(model));

        heater.set_delay_off(min_hours * 3600).await.unwrap();
        heater.set_delay_off(max_hours * 3600).await.unwrap();
        assert!(matches!(
            heater.set_delay_off(max_hours * 3600 + 1).await,
            Err(Error::Value(_))
        ));

        let snapshot = heater.refresh().await.unwrap();
        assert_eq!(snapshot.countdown_time, u32::try_from(max_hours).ok());
    }
}

#[tokio::test]
async fn validation_errors_make_no_device_call() {
    let device = TableDevice::for_model(Model::Mc2);
    let heater = PropertyCoordinator::new(Model::Mc2, Arc::clone(&device));

    let _ = heater.set_led_brightness(LedBrightness::Dim).await;
    let _ = heater.set_target_temperature(35).await;
    let _ = heater.set(Property::Humidity, PropertyValue::Int(10)).await;
    let _ = heater.set(Property::Power, PropertyValue::Led(LedBrightness::On)).await;

    assert_eq!(device.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn offline_write_is_write_failed() {
    let device = TableDevice::for_model(Model::Bs1s);
    device.offline.store(true, Ordering::SeqCst);
    let heater = PropertyCoordinator::new(Model::Bs1s, device);

    let err = heater.set_power(false).await.unwrap_err();
    assert!(matches!(
        err,
        Error::WriteFailed {
            property: Property::Power,
            source: ProtocolError::ConnectionFailed(_)
        }
    ));
    assert_eq!(heater.state(), CoordinatorState::Unrefreshed);
}

#[tokio::test(start_paused = true)]
async fn driver_reports_outage_and_recovery() {
    let device = TableDevice::for_model(Model::Za2);
    let heater = Arc::new(PropertyCoordinator::new(Model::Za2, Arc::clone(&device)));
    let bus = EventBus::new();
    let mut events = bus.subscribe();

    let driver = PollingDriver::spawn(Arc::clone(&heater), Duration::from_secs(30), bus);

    let first = events.recv().await.unwrap();
    let kept = Arc::clone(first.snapshot().unwrap());

    device.offline.store(true, Ordering::SeqCst);
    let outage = events.recv().await.unwrap();
    match &outage {
        HeaterEvent::RefreshFailed { device_id, error } => {
            assert_eq!(*device_id, heater.device_id());
            assert!(error.contains("unreachable"), "{error}");
        }
        HeaterEvent::Refreshed { .. } => panic!("expected a failure"),
    }
    assert!(heater.state().is_stale());
    assert!(Arc::ptr_eq(&heater.snapshot(), &kept));

    device.offline.store(false, Ordering::SeqCst);
    driver.request_refresh();
    let recovered = events.recv().await.unwrap();
    assert!(!recovered.is_failure());
    assert!(heater.state().is_ready());

    driver.shutdown().await;
}
