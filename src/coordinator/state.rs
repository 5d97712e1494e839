// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator freshness state.

use std::fmt;

use serde::Serialize;

/// Freshness of a coordinator's snapshot.
///
/// ```text
/// Unrefreshed --ok--> Ready <--ok-- Stale
///      |                |             ^
///      +------fail------+-----fail----+
/// ```
///
/// `set` never changes the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    /// No refresh has completed yet.
    #[default]
    Unrefreshed,
    /// The last refresh succeeded.
    Ready,
    /// The last refresh failed; the snapshot is from an earlier success, or
    /// empty if there never was one.
    Stale,
}

impl CoordinatorState {
    /// Returns true if the last refresh succeeded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns true if the last refresh failed.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }

    /// Returns the snake_case state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unrefreshed => "unrefreshed",
            Self::Ready => "ready",
            Self::Stale => "stale",
        }
    }
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
