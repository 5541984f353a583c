// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State mirroring.
//!
//! After a command is applied the entity's state topic is republished as a
//! retained message, in the same format the entity accepts as a command:
//!
//! | Kind   | State payload                                            |
//! |--------|----------------------------------------------------------|
//! | light  | `{"state":"ON","color_mode":"rgbw","color":{..},"brightness":n}` |
//! | switch | `ON` / `OFF`                                             |
//! | number | decimal integer                                          |
//! | text   | the stored text                                          |
//!
//! Feeding a state payload back through the command decoder reproduces the
//! same state.
//!
//! # Light echo
//!
//! A light configured to echo commands republishes the raw inbound payload
//! verbatim instead of the re-encoded state. The hub then sees exactly the
//! keys it sent, including ones the device ignored.

use serde::Serialize;

use crate::entity::EntityKind;
use crate::error::{Error, ParseError};
use crate::protocol::Transport;
use crate::state::DeviceState;
use crate::types::{ChannelValue, Rgbw};

#[derive(Serialize)]
struct LightStatePayload<'a> {
    state: &'a str,
    color_mode: &'a str,
    color: Rgbw,
    brightness: ChannelValue,
}

/// Encodes the part of `state` owned by an entity of `kind`.
///
/// # Errors
///
/// Returns `ParseError::Json` if the light document cannot be serialized.
///
/// # Examples
///
/// ```
/// use ha_device_bridge::entity::EntityKind;
/// use ha_device_bridge::publisher::encode_state;
/// use ha_device_bridge::state::{DeviceState, StateChange};
///
/// let mut state = DeviceState::new();
/// state.apply(&StateChange::number(42));
///
/// assert_eq!(encode_state(EntityKind::Number, &state).unwrap(), b"42");
/// assert_eq!(encode_state(EntityKind::Switch, &state).unwrap(), b"OFF");
/// ```
pub fn encode_state(kind: EntityKind, state: &DeviceState) -> Result<Vec<u8>, ParseError> {
    Ok(match kind {
        EntityKind::Light => serde_json::to_vec(&LightStatePayload {
            state: state.power().as_str(),
            color_mode: "rgbw",
            color: state.color(),
            brightness: state.brightness(),
        })?,
        EntityKind::Switch => state.power().as_str().as_bytes().to_vec(),
        EntityKind::Number => state.number().to_string().into_bytes(),
        EntityKind::Text => state.text().as_bytes().to_vec(),
    })
}

/// Republishes entity state after a command.
#[derive(Debug, Clone, Copy, Default)]
pub struct Publisher {
    echo_light_commands: bool,
}

impl Publisher {
    /// Creates a publisher. With `echo_light_commands`, light state is the raw
    /// inbound payload.
    #[must_use]
    pub fn new(echo_light_commands: bool) -> Self {
        Self {
            echo_light_commands,
        }
    }

    /// Returns the payload to publish on the state topic of a `kind` entity.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the light document cannot be serialized.
    pub fn state_payload(
        &self,
        kind: EntityKind,
        state: &DeviceState,
        inbound: &[u8],
    ) -> Result<Vec<u8>, ParseError> {
        if kind == EntityKind::Light && self.echo_light_commands {
            return Ok(inbound.to_vec());
        }
        encode_state(kind, state)
    }

    /// Publishes the state of a `kind` entity as a retained message.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the payload cannot be encoded, or
    /// `Error::Protocol` if the transport rejects the request.
    pub async fn publish<T: Transport>(
        &self,
        transport: &T,
        state_topic: &str,
        kind: EntityKind,
        state: &DeviceState,
        inbound: &[u8],
    ) -> Result<(), Error> {
        let payload = self.state_payload(kind, state, inbound)?;
        tracing::debug!(
            topic = %state_topic,
            entity = %kind,
            bytes = payload.len(),
            "Publishing state"
        );
        transport.publish(state_topic, payload, true).await?;
        Ok(())
    }
}
