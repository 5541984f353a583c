// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Partial state updates.
//!
//! A [`StateChange`] describes the fields a single command touches. Fields
//! left as `None` are not part of the update and keep their last value when
//! the change is applied to a [`DeviceState`](super::DeviceState).
//!
//! # Examples
//!
//! ```
//! use ha_device_bridge::state::{DeviceState, LightChange, StateChange};
//! use ha_device_bridge::types::{ChannelValue, PowerState};
//!
//! let mut state = DeviceState::new();
//!
//! let change = StateChange::Light(LightChange {
//!     state: Some(PowerState::On),
//!     brightness: Some(ChannelValue::new(2000).unwrap()),
//!     ..LightChange::default()
//! });
//! assert!(state.apply(&change));
//!
//! assert!(state.power().is_on());
//! assert_eq!(state.brightness().value(), 2000);
//! ```

use crate::types::{BoundedText, ChannelValue, PowerState};

/// Colour channels present in a light command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorChange {
    /// New red value, if present.
    pub r: Option<ChannelValue>,
    /// New green value, if present.
    pub g: Option<ChannelValue>,
    /// New blue value, if present.
    pub b: Option<ChannelValue>,
    /// New white value, if present.
    pub w: Option<ChannelValue>,
}

impl ColorChange {
    /// Returns `true` if no channel is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.r.is_none() && self.g.is_none() && self.b.is_none() && self.w.is_none()
    }
}

/// Fields present in a light command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightChange {
    /// New on/off state, if present.
    pub state: Option<PowerState>,
    /// Colour channels present in the command.
    pub color: ColorChange,
    /// New brightness, if present.
    pub brightness: Option<ChannelValue>,
}

impl LightChange {
    /// Returns `true` if the command carried no recognised field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.color.is_empty() && self.brightness.is_none()
    }
}

/// A partial update of the device state, produced by one inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// Light command: any subset of on/off, colour channels and brightness.
    Light(LightChange),

    /// Switch command: on/off state.
    Power(PowerState),

    /// Number command: integer value.
    Number(i32),

    /// Text command: truncated text value.
    Text(BoundedText),
}

impl StateChange {
    /// Creates a switch power change.
    #[must_use]
    pub fn power(state: PowerState) -> Self {
        Self::Power(state)
    }

    /// Creates a number change.
    #[must_use]
    pub fn number(value: i32) -> Self {
        Self::Number(value)
    }

    /// Creates a text change, truncating to the maximum length.
    #[must_use]
    pub fn text(value: &str) -> Self {
        Self::Text(BoundedText::truncating(value))
    }
}
