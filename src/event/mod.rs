// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Refresh outcome notifications.
//!
//! The polling driver publishes one [`HeaterEvent`] per refresh on an
//! [`EventBus`]. Presentation adapters subscribe to learn when a snapshot
//! changed or when a heater became unreachable.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use miheater_lib::coordinator::Snapshot;
//! use miheater_lib::event::{DeviceId, EventBus, HeaterEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let device_id = DeviceId::new();
//! bus.publish(HeaterEvent::refreshed(device_id, Arc::new(Snapshot::default())));
//! ```

mod device_id;
mod event_bus;
mod heater_event;

pub use device_id::DeviceId;
pub use event_bus::EventBus;
pub use heater_event::HeaterEvent;
