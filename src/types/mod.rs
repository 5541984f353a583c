// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for the controllable fields of the device.
//!
//! Each type keeps its value inside the range the hub and the hardware
//! expect, so the state record can never hold an unrepresentable value.
//!
//! # Types
//!
//! - [`PowerState`] - On/Off state of the light or switch
//! - [`ChannelValue`] - 12-bit light channel or brightness value (0-4095)
//! - [`Rgbw`] - The four colour channels of the light
//! - [`BoundedText`] - Text entity value, at most 63 bytes

mod channel;
mod power;
mod text;

pub use channel::{ChannelValue, Rgbw};
pub use power::PowerState;
pub use text::BoundedText;
