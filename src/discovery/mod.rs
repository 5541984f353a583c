// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discovery announcements.
//!
//! On every established connection the bridge publishes one retained
//! discovery document per entity to its `config` topic. The hub creates the
//! entity on first sight and de-duplicates later copies, so announcing again
//! after a reconnect is harmless.
//!
//! # Document shapes
//!
//! The light uses the abbreviated device keys (`ids`, `mf`, `mdl`, `sw`,
//! `sn`) and the JSON command schema:
//!
//! ```json
//! {"name":"REGEBELEEGHT","command_topic":"homeassistant/light/6xalj9_light/set",
//!  "state_topic":"homeassistant/light/6xalj9_light/state","unique_id":"6xalj9_light",
//!  "platform":"mqtt","device":{"ids":["6xalj9"],"name":"OngaroLight","mf":"Ongaro",
//!  "mdl":"blingbling","sw":"alpha","sn":124589},"schema":"json","brightness":true,
//!  "brightness_scale":4095,"supported_color_modes":["rgbw"]}
//! ```
//!
//! Switch, number and text use the long device keys, and the number adds its
//! `min`/`max` range.
//!
//! # Examples
//!
//! ```
//! use ha_device_bridge::config::BridgeConfig;
//! use ha_device_bridge::discovery::announcements;
//! use ha_device_bridge::Device;
//!
//! let device = Device::from_config(&BridgeConfig::default().with_device_id("6xalj9")).unwrap();
//! let docs = announcements(&device);
//!
//! assert_eq!(docs.len(), 1);
//! assert_eq!(docs[0].topic, "homeassistant/light/6xalj9_light/config");
//! ```

mod payload;

use crate::device::Device;
use crate::entity::{Entity, EntityConstraints};
use crate::protocol::Transport;

use payload::{ActuatorDevice, ActuatorDocument, LightDevice, LightDocument, PLATFORM};

/// A discovery document ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// Config topic of the entity.
    pub topic: String,
    /// Serialized document.
    pub payload: Vec<u8>,
}

/// Serializes the discovery document of one entity.
///
/// # Errors
///
/// Returns the serializer error if the document cannot be encoded.
pub fn config_document(device: &Device, entity: &Entity) -> Result<Vec<u8>, serde_json::Error> {
    let info = device.info();
    let topics = entity.topics();
    let id = device.id().as_str();

    match entity.constraints() {
        EntityConstraints::Light { brightness_scale } => serde_json::to_vec(&LightDocument {
            name: entity.name(),
            command_topic: &topics.command,
            state_topic: &topics.state,
            unique_id: entity.object_id(),
            platform: PLATFORM,
            device: LightDevice {
                ids: [id],
                name: &info.name,
                mf: &info.manufacturer,
                mdl: &info.model,
                sw: &info.sw_version,
                sn: info.serial_number,
            },
            schema: "json",
            brightness: true,
            brightness_scale,
            supported_color_modes: ["rgbw"],
        }),
        constraints => {
            let (min, max) = match constraints {
                EntityConstraints::Number { min, max } => (Some(min), Some(max)),
                _ => (None, None),
            };
            serde_json::to_vec(&ActuatorDocument {
                name: entity.name(),
                command_topic: &topics.command,
                state_topic: &topics.state,
                unique_id: entity.object_id(),
                device: ActuatorDevice {
                    identifiers: [id],
                    name: &info.name,
                    model: &info.model,
                    manufacturer: &info.manufacturer,
                },
                platform: PLATFORM,
                min,
                max,
            })
        }
    }
}

/// Builds the announcement of every entity, in entity order.
///
/// An entity whose document cannot be built is skipped and logged.
#[must_use]
pub fn announcements(device: &Device) -> Vec<Announcement> {
    device
        .entities()
        .iter()
        .filter_map(|entity| match config_document(device, entity) {
            Ok(payload) => Some(Announcement {
                topic: entity.topics().config.clone(),
                payload,
            }),
            Err(e) => {
                tracing::warn!(
                    entity = %entity.kind(),
                    object_id = %entity.object_id(),
                    error = %e,
                    "Skipping discovery document"
                );
                None
            }
        })
        .collect()
}

/// Publishes every announcement as a retained message.
///
/// Returns the number of documents the transport accepted. Rejected
/// publishes are logged and do not stop the remaining announcements.
pub async fn announce<T: Transport>(transport: &T, device: &Device) -> usize {
    let mut published = 0;
    for announcement in announcements(device) {
        match transport
            .publish(&announcement.topic, announcement.payload, true)
            .await
        {
            Ok(()) => {
                tracing::debug!(topic = %announcement.topic, "Announced entity");
                published += 1;
            }
            Err(e) => {
                tracing::warn!(topic = %announcement.topic, error = %e, "Failed to announce entity");
            }
        }
    }
    published
}
