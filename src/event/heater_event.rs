// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heater event types.

use std::sync::Arc;

use crate::coordinator::Snapshot;

use super::DeviceId;

/// Outcome of one refresh, as published by the polling driver.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use miheater_lib::coordinator::Snapshot;
/// use miheater_lib::event::{DeviceId, HeaterEvent};
///
/// let device_id = DeviceId::new();
///
/// let ok = HeaterEvent::refreshed(device_id, Arc::new(Snapshot::default()));
/// assert!(ok.snapshot().is_some());
///
/// let failed = HeaterEvent::refresh_failed(device_id, "request timed out after 5000 ms");
/// assert!(failed.is_failure());
/// ```
#[derive(Debug, Clone)]
pub enum HeaterEvent {
    /// A refresh succeeded and replaced the snapshot.
    Refreshed {
        /// The coordinator that refreshed.
        device_id: DeviceId,
        /// The new snapshot.
        snapshot: Arc<Snapshot>,
    },

    /// A refresh failed; the previous snapshot is kept and the coordinator is
    /// now stale.
    RefreshFailed {
        /// The coordinator that failed.
        device_id: DeviceId,
        /// Rendered error.
        error: String,
    },
}

impl HeaterEvent {
    /// Creates a refreshed event.
    #[must_use]
    pub fn refreshed(device_id: DeviceId, snapshot: Arc<Snapshot>) -> Self {
        Self::Refreshed {
            device_id,
            snapshot,
        }
    }

    /// Creates a refresh failure event.
    #[must_use]
    pub fn refresh_failed(device_id: DeviceId, error: impl Into<String>) -> Self {
        Self::RefreshFailed {
            device_id,
            error: error.into(),
        }
    }

    /// Returns the device ID associated with this event.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::Refreshed { device_id, .. } | Self::RefreshFailed { device_id, .. } => {
                *device_id
            }
        }
    }

    /// Returns the snapshot of a successful refresh.
    #[must_use]
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            Self::Refreshed { snapshot, .. } => Some(snapshot),
            Self::RefreshFailed { .. } => None,
        }
    }

    /// Returns `true` if the refresh failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::RefreshFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_message() {
        let device_id = DeviceId::new();
        let event = HeaterEvent::refresh_failed(device_id, "boom");

        assert_eq!(event.device_id(), device_id);
        assert!(event.snapshot().is_none());
        match event {
            HeaterEvent::RefreshFailed { error, .. } => assert_eq!(error, "boom"),
            HeaterEvent::Refreshed { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn refreshed_shares_snapshot() {
        let snapshot = Arc::new(Snapshot::default());
        let event = HeaterEvent::refreshed(DeviceId::new(), Arc::clone(&snapshot));

        assert!(!event.is_failure());
        assert!(Arc::ptr_eq(event.snapshot().unwrap(), &snapshot));
    }
}
