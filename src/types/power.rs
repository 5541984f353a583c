// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On/off state shared by the light and switch entities.

use std::fmt;

/// Represents the on/off state of an actuator.
///
/// Home Assistant sends and expects the literals `"ON"` and `"OFF"`.
/// Decoding is deliberately lenient: the exact, case-sensitive literal `"ON"`
/// means on and every other value means off.
///
/// # Examples
///
/// ```
/// use ha_device_bridge::types::PowerState;
///
/// assert_eq!(PowerState::from_command("ON"), PowerState::On);
/// assert_eq!(PowerState::from_command("on"), PowerState::Off);
/// assert_eq!(PowerState::On.as_str(), "ON");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PowerState {
    /// Actuator is off.
    #[default]
    Off,
    /// Actuator is on.
    On,
}

impl PowerState {
    /// Decodes a command literal. Only the exact string `"ON"` maps to on.
    #[must_use]
    pub fn from_command(value: &str) -> Self {
        if value == "ON" { Self::On } else { Self::Off }
    }

    /// Returns the wire literal for this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns `true` if the state is on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

impl From<PowerState> for bool {
    fn from(value: PowerState) -> Self {
        value.is_on()
    }
}
