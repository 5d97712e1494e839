// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel for heater events.

use tokio::sync::broadcast;

use super::HeaterEvent;

/// Default channel capacity for the event bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fan-out of [`HeaterEvent`]s to any number of subscribers.
///
/// One bus may be shared by the drivers of several heaters; clones share the
/// same channel. Each subscriber receives its own copy of every event
/// published after it subscribed.
///
/// # Capacity
///
/// A subscriber that falls more than `capacity` events behind loses the
/// oldest ones and gets `RecvError::Lagged` on its next receive. Since every
/// `Refreshed` event carries a full snapshot, only the latest one matters to
/// most consumers.
///
/// # Examples
///
/// ```
/// use miheater_lib::event::{DeviceId, EventBus, HeaterEvent};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(HeaterEvent::refresh_failed(DeviceId::new(), "request timed out"));
/// assert!(rx.try_recv().unwrap().is_failure());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<HeaterEvent>,
}

impl EventBus {
    /// Creates a bus with the default capacity of 256 events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to heater events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HeaterEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event, dropping it if nobody listens.
    pub fn publish(&self, event: HeaterEvent) {
        let _ = self.publish_counted(event);
    }

    /// Publishes an event and returns how many subscribers received it.
    #[must_use]
    pub fn publish_counted(&self, event: HeaterEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
