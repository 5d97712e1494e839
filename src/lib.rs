// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `miHeater` Lib - A Rust library to monitor and control Xiaomi/Leshow
//! smart heaters.
//!
//! Five heater models speak the MIoT property protocol but store the same
//! logical properties at different addresses, omit some of them, and encode
//! a few values differently. This library hides those differences behind one
//! set of abstract properties.
//!
//! # Supported Models
//!
//! | Model                | Humidity | Controls | LED levels | Target range |
//! |----------------------|----------|----------|------------|--------------|
//! | `zhimi.heater.mc2`   | no       | yes      | on/off     | 18–28 °C     |
//! | `zhimi.heater.mc2a`  | no       | yes      | on/off     | 18–28 °C     |
//! | `zhimi.heater.za2`   | yes      | yes      | on/off/dim | 16–28 °C     |
//! | `zhimi.heater.zb1`   | yes      | no       | none       | 16–28 °C     |
//! | `leshow.heater.bs1s` | no       | yes      | on/off     | 18–28 °C     |
//!
//! "Controls" are the child lock, buzzer, LED and shutoff timer.
//!
//! # Architecture
//!
//! - [`PropertySpec`] / [`ModelLimits`]: static per-model tables
//! - [`codec`]: raw value conversions (LED inversion, timer hours)
//! - [`protocol`]: the [`DeviceClient`](protocol::DeviceClient) trait and
//!   the MiIO UDP transport
//! - [`coordinator`]: snapshot ownership, `refresh()` and `set()`
//! - [`driver`]: periodic polling, publishing to an [`event::EventBus`]
//! - [`entities`]: which presentation entities a model offers
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use miheater_lib::config::HeaterConfig;
//! use miheater_lib::driver::PollingDriver;
//! use miheater_lib::event::EventBus;
//!
//! #[tokio::main]
//! async fn main() -> miheater_lib::Result<()> {
//!     let config = HeaterConfig::new(
//!         "192.168.1.40",
//!         "00112233445566778899aabbccddeeff",
//!         "zhimi.heater.za2",
//!     );
//!     let interval = config.poll_interval;
//!     let heater = Arc::new(config.into_coordinator().await?);
//!
//!     // One-shot read
//!     let snapshot = heater.refresh().await?;
//!     println!("{:?} °C, {:?} %", snapshot.current_temperature, snapshot.humidity);
//!
//!     // Writes are validated against the model before anything is sent
//!     heater.set_target_temperature(21).await?;
//!     heater.set_delay_off(2 * 3600).await?;
//!
//!     // Background polling
//!     let bus = EventBus::new();
//!     let driver = PollingDriver::spawn(Arc::clone(&heater), interval, bus.clone());
//!     driver.request_refresh();
//!
//!     driver.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `miio` (default): the MiIO UDP transport and [`config::HeaterConfig`].
//!   Without it, any custom [`DeviceClient`](protocol::DeviceClient) can
//!   still drive a coordinator.

mod capabilities;
pub mod codec;
#[cfg(feature = "miio")]
pub mod config;
pub mod coordinator;
pub mod driver;
pub mod entities;
pub mod error;
pub mod event;
pub mod protocol;
pub mod types;

pub use capabilities::{IntRange, ModelLimits, PropertySpec};
pub use coordinator::{CoordinatorState, PropertyCoordinator, Snapshot};
pub use driver::{DEFAULT_POLL_INTERVAL, DriverHandle, PollingDriver};
pub use entities::{EntityKind, EntitySet};
pub use error::{Error, ParseError, ProtocolError, Result, ValueError};
pub use event::{DeviceId, EventBus, HeaterEvent};
#[cfg(feature = "miio")]
pub use protocol::{MiioClient, MiioConfig};
pub use protocol::{DeviceClient, PropertyReading};
pub use types::{Address, LedBrightness, Model, Property, PropertyValue, RawValue};
