// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bare-literal command decoding for switch, number and text entities.
//!
//! None of these decoders can fail: every payload maps to some value.

use crate::types::{BoundedText, PowerState};

/// Decodes a switch payload. Only the exact bytes `ON` switch on.
#[must_use]
pub fn decode_switch(payload: &[u8]) -> PowerState {
    PowerState::from(payload == b"ON")
}

/// Decodes a number payload with C `atoi` leniency.
///
/// Leading ASCII whitespace is skipped, an optional sign is accepted and
/// digits are read until the first non-digit. A payload with no leading
/// digits decodes as `0`. Values beyond the `i32` range saturate.
///
/// # Examples
///
/// ```
/// use ha_device_bridge::command::decode_number;
///
/// assert_eq!(decode_number(b"42"), 42);
/// assert_eq!(decode_number(b"  -7"), -7);
/// assert_eq!(decode_number(b"12abc"), 12);
/// assert_eq!(decode_number(b"abc"), 0);
/// ```
#[must_use]
// The final cast follows a clamp into the i32 range.
#[allow(clippy::cast_possible_truncation)]
pub fn decode_number(payload: &[u8]) -> i32 {
    let mut bytes = payload
        .iter()
        .copied()
        .skip_while(u8::is_ascii_whitespace)
        .peekable();

    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    for digit in bytes.map_while(|b| b.is_ascii_digit().then(|| i64::from(b - b'0'))) {
        value = value * 10 + digit;
        // Past every i32 magnitude; further digits cannot bring it back.
        if value > i64::from(i32::MAX) + 1 {
            break;
        }
    }

    let signed = if negative { -value } else { value };
    signed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Decodes a text payload, truncating to the maximum length.
#[must_use]
pub fn decode_text(payload: &[u8]) -> BoundedText {
    BoundedText::from_payload(payload)
}
