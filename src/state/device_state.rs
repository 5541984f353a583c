// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Current values of every controllable field.

use crate::types::{BoundedText, ChannelValue, PowerState, Rgbw};

use super::{LightChange, StateChange};

/// Current value of every controllable field of the device.
///
/// The record starts zeroed and off. Each field always holds the last value
/// successfully decoded for it; a command that omits a field never resets it.
/// The on/off flag is shared by the light and the switch, since a device
/// profile exposes at most one of them.
///
/// # Examples
///
/// ```
/// use ha_device_bridge::state::{DeviceState, StateChange};
/// use ha_device_bridge::types::PowerState;
///
/// let mut state = DeviceState::new();
/// assert!(state.apply(&StateChange::power(PowerState::On)));
/// assert!(!state.apply(&StateChange::power(PowerState::On)));
/// assert_eq!(state.power(), PowerState::On);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    power: PowerState,
    color: Rgbw,
    brightness: ChannelValue,
    number: i32,
    text: BoundedText,
}

impl DeviceState {
    /// Creates the initial all-zero, off state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the on/off state.
    #[must_use]
    pub fn power(&self) -> PowerState {
        self.power
    }

    /// Returns the light colour channels.
    #[must_use]
    pub fn color(&self) -> Rgbw {
        self.color
    }

    /// Returns the light brightness.
    #[must_use]
    pub fn brightness(&self) -> ChannelValue {
        self.brightness
    }

    /// Returns the number entity value.
    #[must_use]
    pub fn number(&self) -> i32 {
        self.number
    }

    /// Returns the text entity value.
    #[must_use]
    pub fn text(&self) -> &BoundedText {
        &self.text
    }

    /// Applies a partial update and returns whether any field changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        match change {
            StateChange::Light(light) => self.apply_light(light),
            StateChange::Power(state) => replace(&mut self.power, *state),
            StateChange::Number(value) => replace(&mut self.number, *value),
            StateChange::Text(text) => replace(&mut self.text, text.clone()),
        }
    }

    fn apply_light(&mut self, change: &LightChange) -> bool {
        let mut changed = false;

        macro_rules! update_if_some {
            ($field:expr, $value:expr) => {
                if let Some(v) = $value {
                    changed |= replace(&mut $field, v);
                }
            };
        }

        update_if_some!(self.power, change.state);
        update_if_some!(self.color.r, change.color.r);
        update_if_some!(self.color.g, change.color.g);
        update_if_some!(self.color.b, change.color.b);
        update_if_some!(self.color.w, change.color.w);
        update_if_some!(self.brightness, change.brightness);

        changed
    }
}

/// Stores `value` in `slot` and reports whether it differed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ColorChange;

    fn cv(value: u16) -> ChannelValue {
        ChannelValue::new(value).unwrap()
    }

    fn lit_state() -> DeviceState {
        let mut state = DeviceState::new();
        state.apply(&StateChange::Light(LightChange {
            state: Some(PowerState::On),
            color: ColorChange {
                r: Some(cv(10)),
                g: Some(cv(20)),
                b: Some(cv(30)),
                w: Some(cv(40)),
            },
            brightness: Some(cv(500)),
        }));
        state
    }

    #[test]
    fn initial_state_is_zero_and_off() {
        let state = DeviceState::new();
        assert_eq!(state.power(), PowerState::Off);
        assert_eq!(state.color(), Rgbw::default());
        assert_eq!(state.brightness(), ChannelValue::MIN);
        assert_eq!(state.number(), 0);
        assert!(state.text().is_empty());
    }

    #[test]
    fn brightness_only_leaves_other_fields() {
        let mut state = lit_state();
        let before = state.clone();

        let changed = state.apply(&StateChange::Light(LightChange {
            brightness: Some(cv(4000)),
            ..LightChange::default()
        }));

        assert!(changed);
        assert_eq!(state.brightness(), cv(4000));
        assert_eq!(state.color(), before.color());
        assert_eq!(state.power(), before.power());
    }

    #[test]
    fn partial_color_updates_only_present_channels() {
        let mut state = lit_state();
        state.apply(&StateChange::Light(LightChange {
            color: ColorChange {
                g: Some(cv(999)),
                ..ColorChange::default()
            },
            ..LightChange::default()
        }));

        let color = state.color();
        assert_eq!(color.r, cv(10));
        assert_eq!(color.g, cv(999));
        assert_eq!(color.b, cv(30));
        assert_eq!(color.w, cv(40));
    }

    #[test]
    fn empty_light_change_reports_unchanged() {
        let mut state = lit_state();
        assert!(!state.apply(&StateChange::Light(LightChange::default())));
        assert_eq!(state, lit_state());
    }

    #[test]
    fn scalar_changes() {
        let mut state = DeviceState::new();
        assert!(state.apply(&StateChange::number(42)));
        assert!(!state.apply(&StateChange::number(42)));
        assert!(state.apply(&StateChange::text("hello")));
        assert_eq!(state.number(), 42);
        assert_eq!(state.text().as_str(), "hello");
    }
}
