// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared state store.

use parking_lot::RwLock;

use super::{DeviceState, StateChange};

/// Process-wide owner of the [`DeviceState`].
///
/// The event dispatcher is the only writer; the publisher and the output
/// task read. Every update is applied under a single write lock and every
/// read clones under a read lock, so a reader sees either the whole update
/// or none of it, never a mix of old and new channels.
///
/// # Examples
///
/// ```
/// use ha_device_bridge::state::{StateChange, StateStore};
///
/// let store = StateStore::new();
/// let snapshot = store.apply(&StateChange::number(7));
/// assert_eq!(snapshot.number(), 7);
/// assert_eq!(store.snapshot().number(), 7);
/// ```
#[derive(Debug, Default)]
pub struct StateStore {
    state: RwLock<DeviceState>,
}

impl StateStore {
    /// Creates a store holding the initial all-zero state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `state`.
    #[must_use]
    pub fn with_state(state: DeviceState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> DeviceState {
        self.state.read().clone()
    }

    /// Atomically applies a partial update and returns the post-update state.
    pub fn apply(&self, change: &StateChange) -> DeviceState {
        let mut state = self.state.write();
        let changed = state.apply(change);
        tracing::trace!(changed, "Applied state change");
        state.clone()
    }
}
