// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tags the events of one coordinator.
///
/// Every coordinator gets a random UUID v4 when created. Hosts that persist
/// entity registrations can store the id and hand it back through
/// [`PropertyCoordinator::with_device_id`](crate::coordinator::PropertyCoordinator::with_device_id)
/// so that events keep the same id across restarts.
///
/// # Examples
///
/// ```
/// use miheater_lib::event::DeviceId;
///
/// let id = DeviceId::new();
/// let stored = id.to_string();
///
/// let restored: DeviceId = stored.parse().unwrap();
/// assert_eq!(restored, id);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(Uuid);

impl DeviceId {
    /// Generates a random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Returns the first eight hex digits, enough to tell heaters apart in
    /// logs.
    #[must_use]
    pub fn short(&self) -> String {
        let mut simple = self.0.simple().to_string();
        simple.truncate(8);
        simple
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DeviceId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for DeviceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({}...)", self.short())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}
