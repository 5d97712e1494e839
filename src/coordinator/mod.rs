// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot ownership and property mutation for one heater.
//!
//! A [`PropertyCoordinator`] is the single owner of a heater's [`Snapshot`].
//! `refresh()` replaces the snapshot from one batched read; `set()` validates
//! and writes one property without touching it. The [`CoordinatorState`]
//! records whether the last refresh succeeded.

mod property_coordinator;
mod snapshot;
mod state;

pub use property_coordinator::PropertyCoordinator;
pub use snapshot::Snapshot;
pub use state::CoordinatorState;
