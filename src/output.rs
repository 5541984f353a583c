// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Physical output.
//!
//! The output side samples the [`StateStore`] on a fixed period, independent
//! of message arrival, and hands each snapshot to an [`OutputSink`].

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::state::{DeviceState, StateStore};

/// Receiver of periodic state snapshots.
pub trait OutputSink: Send + 'static {
    /// Drives the output from the current state.
    fn drive(&mut self, state: &DeviceState);
}

/// Simulated digital pin following the on/off flag.
///
/// Only level transitions are logged.
#[derive(Debug, Clone, Default)]
pub struct PinLevelSink {
    pin: u8,
    level: Option<bool>,
    transitions: u64,
}

impl PinLevelSink {
    /// Creates a sink for pin number `pin`, level not yet driven.
    #[must_use]
    pub fn new(pin: u8) -> Self {
        Self {
            pin,
            level: None,
            transitions: 0,
        }
    }

    /// Returns the last driven level, or `None` before the first sample.
    #[must_use]
    pub fn level(&self) -> Option<bool> {
        self.level
    }

    /// Returns how many times the level changed.
    #[must_use]
    pub fn transitions(&self) -> u64 {
        self.transitions
    }
}

impl OutputSink for PinLevelSink {
    fn drive(&mut self, state: &DeviceState) {
        let level = state.power().is_on();
        if self.level == Some(level) {
            return;
        }
        if self.level.is_some() {
            self.transitions += 1;
        }
        self.level = Some(level);
        tracing::info!(pin = self.pin, high = level, "Output level changed");
    }
}

/// Spawns a task feeding `sink` a snapshot of `store` every `period`.
///
/// The first sample is taken immediately. Missed ticks are skipped rather
/// than replayed. The task runs until aborted.
pub fn spawn_output_task<S: OutputSink>(
    store: Arc<StateStore>,
    mut sink: S,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            sink.drive(&store.snapshot());
        }
    })
}
