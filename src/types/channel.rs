// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light channel value type.
//!
//! Every light channel (red, green, blue, white) and the overall brightness
//! share the same 12-bit range, matching a 4096-step PWM output.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// A 12-bit light channel value (0-4095).
///
/// # Examples
///
/// ```
/// use ha_device_bridge::types::ChannelValue;
///
/// let half = ChannelValue::new(2048).unwrap();
/// assert_eq!(half.value(), 2048);
///
/// assert!(ChannelValue::new(4096).is_err());
/// assert_eq!(ChannelValue::saturating(-5), ChannelValue::MIN);
/// assert_eq!(ChannelValue::saturating(70_000), ChannelValue::MAX);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u16", into = "u16")]
pub struct ChannelValue(u16);

impl ChannelValue {
    /// Lowest channel value (channel off).
    pub const MIN: Self = Self(0);

    /// Highest channel value (channel fully on).
    pub const MAX: Self = Self(4095);

    /// Creates a new channel value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 4095.
    pub fn new(value: u16) -> Result<Self, ValueError> {
        if value > Self::MAX.0 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: i64::from(Self::MAX.0),
                actual: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a channel value, clamping any integer into the valid range.
    #[must_use]
    pub fn saturating(value: i64) -> Self {
        let clamped = value.clamp(0, i64::from(Self::MAX.0));
        // Clamped into 0..=4095 above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self(clamped as u16)
    }

    /// Returns the raw channel value.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ChannelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for ChannelValue {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelValue> for u16 {
    fn from(value: ChannelValue) -> Self {
        value.0
    }
}

/// The four colour channels of an RGBW light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgbw {
    /// Red channel.
    pub r: ChannelValue,
    /// Green channel.
    pub g: ChannelValue,
    /// Blue channel.
    pub b: ChannelValue,
    /// White channel.
    pub w: ChannelValue,
}

impl Rgbw {
    /// Creates a colour from four raw channel values.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if any channel exceeds 4095.
    pub fn new(r: u16, g: u16, b: u16, w: u16) -> Result<Self, ValueError> {
        Ok(Self {
            r: ChannelValue::new(r)?,
            g: ChannelValue::new(g)?,
            b: ChannelValue::new(b)?,
            w: ChannelValue::new(w)?,
        })
    }
}
