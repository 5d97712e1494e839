// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic refresh of a coordinator.
//!
//! The driver is a tokio task that refreshes a coordinator immediately, then
//! once per interval, and again whenever [`DriverHandle::request_refresh`] is
//! called. Every outcome is published on an [`EventBus`]. A failed refresh is
//! not retried before the next tick.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use miheater_lib::coordinator::PropertyCoordinator;
//! use miheater_lib::driver::{DEFAULT_POLL_INTERVAL, PollingDriver};
//! use miheater_lib::event::{EventBus, HeaterEvent};
//! use miheater_lib::protocol::MiioConfig;
//! use miheater_lib::Model;
//!
//! # async fn example() -> miheater_lib::Result<()> {
//! let client = MiioConfig::new("192.168.1.40", "00112233445566778899aabbccddeeff")
//!     .connect()
//!     .await?;
//! let heater = Arc::new(PropertyCoordinator::new(Model::Mc2, client));
//!
//! let bus = EventBus::new();
//! let mut events = bus.subscribe();
//! let driver = PollingDriver::spawn(Arc::clone(&heater), DEFAULT_POLL_INTERVAL, bus);
//!
//! while let Ok(event) = events.recv().await {
//!     if let HeaterEvent::Refreshed { snapshot, .. } = event {
//!         println!("now {:?} °C", snapshot.current_temperature);
//!         break;
//!     }
//! }
//!
//! driver.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::coordinator::PropertyCoordinator;
use crate::event::{EventBus, HeaterEvent};
use crate::protocol::DeviceClient;

/// Interval between periodic refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Spawns polling tasks.
#[derive(Debug, Clone, Copy)]
pub struct PollingDriver;

impl PollingDriver {
    /// Starts polling `coordinator` every `interval` on the current tokio
    /// runtime.
    ///
    /// The first refresh runs right away.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero or if called outside a tokio runtime.
    #[must_use]
    pub fn spawn<C>(
        coordinator: Arc<PropertyCoordinator<C>>,
        interval: Duration,
        bus: EventBus,
    ) -> DriverHandle
    where
        C: DeviceClient + 'static,
    {
        let refresh = Arc::new(Notify::new());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run(
            coordinator,
            interval,
            bus,
            Arc::clone(&refresh),
            shutdown_rx,
        ));

        DriverHandle {
            refresh,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Controls a running polling task.
///
/// Dropping the handle aborts the task.
#[derive(Debug)]
pub struct DriverHandle {
    refresh: Arc<Notify>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl DriverHandle {
    /// Asks for a refresh outside the regular schedule.
    ///
    /// Requests made while one is already pending are merged into it. The
    /// periodic schedule restarts from the out-of-band refresh.
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    /// Returns `true` while the polling task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops polling and waits for the task to exit.
    ///
    /// A refresh in progress is allowed to finish. If the task had already
    /// died from a panic, the panic is logged and not propagated.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!(panicked = e.is_panic(), error = %e, "Polling driver task failed");
        }
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

async fn run<C: DeviceClient>(
    coordinator: Arc<PropertyCoordinator<C>>,
    interval: Duration,
    bus: EventBus,
    refresh: Arc<Notify>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let device_id = coordinator.device_id();
    tracing::debug!(%device_id, interval_secs = interval.as_secs(), "Starting polling driver");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            () = refresh.notified() => {
                tracing::trace!(%device_id, "Out-of-band refresh requested");
                ticker.reset();
            }
            _ = ticker.tick() => {}
        }

        let event = match coordinator.refresh().await {
            Ok(snapshot) => HeaterEvent::refreshed(device_id, snapshot),
            Err(e) => HeaterEvent::refresh_failed(device_id, e.to_string()),
        };
        let receivers = bus.publish_counted(event);
        tracing::trace!(%device_id, receivers, "Published refresh outcome");
    }

    tracing::debug!(%device_id, "Polling driver stopped");
}
