// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light command decoding (JSON schema).
//!
//! The hub sends light commands as a JSON document where every key is
//! optional:
//!
//! ```json
//! {"state": "ON", "color": {"r": 4095, "g": 0, "b": 0, "w": 0}, "brightness": 2048}
//! ```
//!
//! Keys are looked up individually. A key that is missing or holds a value
//! of the wrong JSON type is skipped and leaves its field unchanged. Only a
//! document that fails to parse at all is rejected, and then as a whole.

use serde_json::Value;

use crate::error::ParseError;
use crate::state::{ColorChange, LightChange};
use crate::types::{ChannelValue, PowerState};

/// Decodes a light command payload into the fields it carries.
///
/// # Errors
///
/// Returns `ParseError::Json` if the payload is not a JSON document.
///
/// # Examples
///
/// ```
/// use ha_device_bridge::command::decode_light;
/// use ha_device_bridge::types::PowerState;
///
/// let change = decode_light(br#"{"state":"ON","brightness":100}"#).unwrap();
/// assert_eq!(change.state, Some(PowerState::On));
/// assert_eq!(change.brightness.unwrap().value(), 100);
/// assert!(change.color.is_empty());
///
/// assert!(decode_light(br#"{"state":"#).is_err());
/// ```
pub fn decode_light(payload: &[u8]) -> Result<LightChange, ParseError> {
    let root: Value = serde_json::from_slice(payload)?;

    let state = root
        .get("state")
        .and_then(Value::as_str)
        .map(PowerState::from_command);

    let color = root
        .get("color")
        .filter(|value| value.is_object())
        .map(|color| ColorChange {
            r: color.get("r").and_then(channel),
            g: color.get("g").and_then(channel),
            b: color.get("b").and_then(channel),
            w: color.get("w").and_then(channel),
        })
        .unwrap_or_default();

    let brightness = root.get("brightness").and_then(channel);

    Ok(LightChange {
        state,
        color,
        brightness,
    })
}

/// Reads a JSON number as a channel value.
///
/// Fractions are truncated towards zero and out-of-range values clamped.
// Float-to-int casts saturate; u64 values above i64::MAX take that path too.
#[allow(clippy::cast_possible_truncation)]
fn channel(value: &Value) -> Option<ChannelValue> {
    let integer = value
        .as_i64()
        .or_else(|| value.as_f64().map(|float| float as i64))?;
    Some(ChannelValue::saturating(integer))
}
