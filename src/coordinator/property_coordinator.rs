// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model-aware read/write coordination for one heater.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::{Mutex, watch};

use crate::capabilities::{ModelLimits, PropertySpec};
use crate::codec::{LedCodec, seconds_to_countdown_hours};
use crate::error::{Error, ProtocolError, Result, ValueError};
use crate::event::DeviceId;
use crate::protocol::DeviceClient;
use crate::types::{Address, LedBrightness, Model, Property, PropertyValue, RawValue};

use super::{CoordinatorState, Snapshot};

/// Owns the snapshot of one heater and mediates every device call.
///
/// The coordinator translates abstract [`Property`] names to the addresses of
/// its model, batches reads into a single round trip and validates writes
/// against the model's capabilities and limits before anything is sent.
///
/// At most one device call is in flight per coordinator: the transport is
/// guarded by an async mutex held for the duration of one round trip.
/// Readers of the snapshot never wait on it.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use miheater_lib::coordinator::PropertyCoordinator;
/// use miheater_lib::protocol::MiioConfig;
/// use miheater_lib::{LedBrightness, Model};
///
/// # async fn example() -> miheater_lib::Result<()> {
/// let client = MiioConfig::new("192.168.1.40", "00112233445566778899aabbccddeeff")
///     .connect()
///     .await?;
/// let heater = Arc::new(PropertyCoordinator::new(Model::Za2, client));
///
/// let snapshot = heater.refresh().await?;
/// println!("{:?} °C", snapshot.current_temperature);
///
/// heater.set_target_temperature(22).await?;
/// heater.set_led_brightness(LedBrightness::Dim).await?;
/// # Ok(())
/// # }
/// ```
pub struct PropertyCoordinator<C> {
    id: DeviceId,
    model: Model,
    spec: &'static PropertySpec,
    limits: ModelLimits,
    led: LedCodec,
    client: Mutex<C>,
    state: RwLock<CoordinatorState>,
    snapshot: watch::Sender<Arc<Snapshot>>,
}

impl<C: DeviceClient> PropertyCoordinator<C> {
    /// Creates a coordinator for a heater of the given model.
    ///
    /// No device call is made; the coordinator starts `Unrefreshed` with an
    /// empty snapshot.
    #[must_use]
    pub fn new(model: Model, client: C) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::default()));
        Self {
            id: DeviceId::new(),
            model,
            spec: PropertySpec::for_model(model),
            limits: ModelLimits::for_model(model),
            led: LedCodec::for_model(model),
            client: Mutex::new(client),
            state: RwLock::new(CoordinatorState::Unrefreshed),
            snapshot,
        }
    }

    /// Replaces the generated device id.
    #[must_use]
    pub fn with_device_id(mut self, id: DeviceId) -> Self {
        self.id = id;
        self
    }

    // ========== Accessors ==========

    /// Returns the id used in published events.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.id
    }

    /// Returns the configured model.
    #[must_use]
    pub fn model(&self) -> Model {
        self.model
    }

    /// Returns the property table of the model.
    #[must_use]
    pub fn spec(&self) -> &'static PropertySpec {
        self.spec
    }

    /// Returns the numeric limits of the model.
    #[must_use]
    pub fn limits(&self) -> ModelLimits {
        self.limits
    }

    /// Returns the LED brightness options the model accepts.
    #[must_use]
    pub fn led_options(&self) -> &'static [LedBrightness] {
        self.led.supported_options()
    }

    /// Returns whether the model supports a property.
    #[must_use]
    pub fn supports(&self, property: Property) -> bool {
        self.spec.supports(property)
    }

    /// Returns the freshness state.
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        *self.state.read()
    }

    /// Returns the current snapshot.
    ///
    /// The returned value is never modified; a later refresh installs a new
    /// one.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    /// Watches snapshot replacements.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.subscribe()
    }

    // ========== Refresh ==========

    /// Reads every supported property in one round trip and installs the
    /// result as the new snapshot.
    ///
    /// Properties the device fails to report individually become unknown in
    /// the new snapshot; that is still a successful refresh.
    ///
    /// # Errors
    ///
    /// Returns `Error::RefreshFailed` if the round trip fails. The previous
    /// snapshot is kept and the state becomes `Stale`. Nothing is retried.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>> {
        let addresses: Vec<Address> = self.spec.readable().map(|(_, addr)| addr).collect();

        tracing::debug!(
            device_id = %self.id,
            model = %self.model,
            properties = addresses.len(),
            "Refreshing heater"
        );

        let result = {
            let client = self.client.lock().await;
            client.read(&addresses).await
        };

        match result {
            Ok(readings) => {
                let failed = readings.iter().filter(|r| !r.is_success()).count();
                if failed > 0 {
                    tracing::trace!(device_id = %self.id, failed, "Device did not serve every property");
                }

                let snapshot = Arc::new(Snapshot::decode(self.model, &readings, Utc::now()));
                self.snapshot.send_replace(Arc::clone(&snapshot));
                *self.state.write() = CoordinatorState::Ready;
                Ok(snapshot)
            }
            Err(e) => {
                tracing::warn!(device_id = %self.id, error = %e, "Heater refresh failed");
                *self.state.write() = CoordinatorState::Stale;
                Err(Error::RefreshFailed(e))
            }
        }
    }

    // ========== Mutation ==========

    /// Writes one property.
    ///
    /// The value is validated and encoded for the model before any device
    /// call. The snapshot is not updated; call [`refresh`](Self::refresh) to
    /// observe the effect.
    ///
    /// # Errors
    ///
    /// - `Error::UnsupportedProperty` if the model has no such property
    /// - `Error::ReadOnlyProperty` for sensor readings
    /// - `Error::Value` for a value of the wrong kind or out of range
    /// - `Error::UnsupportedOption` for an LED option the model lacks
    /// - `Error::WriteFailed` if the round trip fails or the device rejects
    ///   the value
    pub async fn set(&self, property: Property, value: PropertyValue) -> Result<()> {
        let (address, raw) = self.encode_write(property, value)?;

        tracing::debug!(
            device_id = %self.id,
            %property,
            %address,
            value = %raw,
            "Writing heater property"
        );

        let result = {
            let client = self.client.lock().await;
            client.write(address, raw).await
        };

        let source = match result {
            Ok(true) => return Ok(()),
            Ok(false) => ProtocolError::CommandRejected {
                code: -1,
                message: format!("device did not accept {property}"),
            },
            Err(e) => e,
        };

        tracing::warn!(device_id = %self.id, %property, error = %source, "Heater write failed");
        Err(Error::WriteFailed { property, source })
    }

    /// Writes a property given by its snake_case name.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidProperty` for an unknown name, otherwise
    /// the errors of [`set`](Self::set).
    pub async fn set_by_name(&self, name: &str, value: PropertyValue) -> Result<()> {
        let property: Property = name.parse()?;
        self.set(property, value).await
    }

    /// Turns heating on or off.
    ///
    /// # Errors
    ///
    /// See [`set`](Self::set).
    pub async fn set_power(&self, on: bool) -> Result<()> {
        self.set(Property::Power, PropertyValue::Bool(on)).await
    }

    /// Sets the target temperature in °C.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` outside the model's range; see also
    /// [`set`](Self::set).
    pub async fn set_target_temperature(&self, celsius: i64) -> Result<()> {
        self.set(Property::TargetTemperature, PropertyValue::Int(celsius))
            .await
    }

    /// Locks or unlocks the physical buttons.
    ///
    /// # Errors
    ///
    /// See [`set`](Self::set).
    pub async fn set_child_lock(&self, locked: bool) -> Result<()> {
        self.set(Property::ChildLock, PropertyValue::Bool(locked)).await
    }

    /// Enables or disables the buzzer.
    ///
    /// # Errors
    ///
    /// See [`set`](Self::set).
    pub async fn set_buzzer(&self, enabled: bool) -> Result<()> {
        self.set(Property::Buzzer, PropertyValue::Bool(enabled)).await
    }

    /// Sets the display brightness.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedOption` for `Dim` on two-level models; see
    /// also [`set`](Self::set).
    pub async fn set_led_brightness(&self, option: LedBrightness) -> Result<()> {
        self.set(Property::LedBrightness, PropertyValue::Led(option))
            .await
    }

    /// Sets the shutoff timer in seconds.
    ///
    /// The device stores whole hours, so the value is truncated:
    /// `30000` seconds becomes 8 hours.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` outside the model's range; see also
    /// [`set`](Self::set).
    pub async fn set_delay_off(&self, seconds: i64) -> Result<()> {
        self.set(Property::DelayOff, PropertyValue::Int(seconds)).await
    }

    fn encode_write(&self, property: Property, value: PropertyValue) -> Result<(Address, RawValue)> {
        let address = self.spec.address(property).ok_or(Error::UnsupportedProperty {
            property,
            model: self.model,
        })?;

        let expect_bool = || {
            value.as_bool().ok_or(ValueError::TypeMismatch {
                property,
                expected: "boolean",
            })
        };
        let expect_int = || {
            value.as_int().ok_or(ValueError::TypeMismatch {
                property,
                expected: "integer",
            })
        };

        let raw = match property {
            Property::CurrentTemperature | Property::Humidity => {
                return Err(Error::ReadOnlyProperty(property));
            }
            Property::Power | Property::ChildLock | Property::Buzzer => {
                RawValue::Bool(expect_bool()?)
            }
            Property::TargetTemperature => {
                RawValue::Int(self.limits.temperature.check(expect_int()?)?)
            }
            Property::CountdownTime => {
                RawValue::Int(self.limits.delay_off_hours.check(expect_int()?)?)
            }
            Property::DelayOff => {
                let seconds = self.limits.delay_off_seconds().check(expect_int()?)?;
                RawValue::Int(seconds_to_countdown_hours(seconds))
            }
            Property::LedBrightness => {
                let option = value.as_led().ok_or(ValueError::TypeMismatch {
                    property,
                    expected: "LED brightness",
                })?;
                let encoded = self.led.encode(option).ok_or(Error::UnsupportedOption {
                    option,
                    model: self.model,
                })?;
                RawValue::Int(encoded)
            }
        };

        Ok((address, raw))
    }
}

impl<C> fmt::Debug for PropertyCoordinator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyCoordinator")
            .field("id", &self.id)
            .field("model", &self.model)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}
