// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! - [`DeviceState`] is the record of current values, one field per
//!   controllable field of the device.
//! - [`StateChange`] is a partial update decoded from one inbound command.
//! - [`StateStore`] owns the record for the whole process and exposes an
//!   atomic apply and a snapshot read.
//!
//! # Examples
//!
//! ```
//! use ha_device_bridge::state::{StateChange, StateStore};
//! use ha_device_bridge::types::PowerState;
//!
//! let store = StateStore::new();
//! store.apply(&StateChange::power(PowerState::On));
//!
//! assert_eq!(store.snapshot().power(), PowerState::On);
//! ```

mod device_state;
mod state_change;
mod store;

pub use device_state::DeviceState;
pub use state_change::{ColorChange, LightChange, StateChange};
pub use store::StateStore;
