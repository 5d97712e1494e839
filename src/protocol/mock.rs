// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory device used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::ProtocolError;
use crate::protocol::{DeviceClient, PropertyReading};
use crate::types::{Address, RawValue};

/// Device error code for a property the firmware does not have.
pub(crate) const NOT_FOUND: i64 = -4003;

/// A scripted device.
///
/// Addresses with a stored value answer successfully, addresses listed in
/// `omitted` are left out of the reply, every other address answers with
/// [`NOT_FOUND`].
#[derive(Debug, Default)]
pub(crate) struct MockClient {
    values: Mutex<HashMap<Address, RawValue>>,
    omitted: Mutex<HashSet<Address>>,
    writes: Mutex<Vec<(Address, RawValue)>>,
    fail_reads: AtomicBool,
    reject_writes: AtomicBool,
    panic_on_read: AtomicBool,
    reads: AtomicUsize,
}

impl MockClient {
    pub fn with_values(values: impl IntoIterator<Item = (Address, RawValue)>) -> Self {
        let client = Self::default();
        client.values.lock().extend(values);
        client
    }

    pub fn omit(&self, address: Address) {
        self.omitted.lock().insert(address);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub fn panic_on_read(&self, panic: bool) {
        self.panic_on_read.store(panic, Ordering::SeqCst);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<(Address, RawValue)> {
        self.writes.lock().clone()
    }
}

impl DeviceClient for MockClient {
    async fn read(&self, addresses: &[Address]) -> Result<Vec<PropertyReading>, ProtocolError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        assert!(!self.panic_on_read.load(Ordering::SeqCst), "device firmware crashed");
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ProtocolError::Timeout(5000));
        }

        let values = self.values.lock();
        let omitted = self.omitted.lock();
        Ok(addresses
            .iter()
            .filter(|addr| !omitted.contains(addr))
            .map(|addr| match values.get(addr) {
                Some(value) => PropertyReading::ok(*addr, value.clone()),
                None => PropertyReading::failed(*addr, NOT_FOUND),
            })
            .collect())
    }

    async fn write(&self, address: Address, value: RawValue) -> Result<bool, ProtocolError> {
        self.writes.lock().push((address, value));
        Ok(!self.reject_writes.load(Ordering::SeqCst))
    }
}
