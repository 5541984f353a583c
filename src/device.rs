// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The single device instance a bridge exposes.
//!
//! A [`Device`] fixes the identity, the announced description and the list of
//! entities. It is built once, before the first connection, and shared
//! read-only by the announcer, the interpreter and the publisher.
//!
//! # Examples
//!
//! ```
//! use ha_device_bridge::config::{BridgeConfig, Profile};
//! use ha_device_bridge::Device;
//!
//! let config = BridgeConfig::default()
//!     .with_profile(Profile::Actuators)
//!     .with_device_id("abc123");
//! let device = Device::from_config(&config).unwrap();
//!
//! let objects: Vec<_> = device.entities().iter().map(|e| e.object_id()).collect();
//! assert_eq!(objects, ["abc123switch", "abc123number", "abc123text"]);
//! ```

use crate::config::{BridgeConfig, DeviceInfo, Profile};
use crate::entity::{Entity, EntityConstraints, ObjectIdScheme};
use crate::error::ConfigError;
use crate::identity::DeviceId;
use crate::types::{BoundedText, ChannelValue};

/// Identity, description and entities of the exposed device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    id: DeviceId,
    info: DeviceInfo,
    profile: Profile,
    entities: Vec<Entity>,
    echo_light_commands: bool,
}

impl Device {
    /// Builds the device described by `config`.
    ///
    /// Uses the pinned device id if one is configured, otherwise generates a
    /// fresh one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the pinned device id is malformed.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, ConfigError> {
        let id = match &config.device_id {
            Some(pinned) => DeviceId::parse(pinned)?,
            None => DeviceId::generate(),
        };
        Ok(Self::with_id(config, id))
    }

    /// Builds the device described by `config` under an explicit id.
    #[must_use]
    pub fn with_id(config: &BridgeConfig, id: DeviceId) -> Self {
        let entities = match config.profile {
            Profile::Light => {
                let object_id = config
                    .light
                    .object_id
                    .clone()
                    .unwrap_or_else(|| format!("{id}_light"));
                vec![Entity::new(
                    &id,
                    &ObjectIdScheme::Literal(object_id),
                    config.light.name.as_str(),
                    EntityConstraints::Light {
                        brightness_scale: ChannelValue::MAX.value(),
                    },
                )]
            }
            Profile::Actuators => {
                let scheme = ObjectIdScheme::Concatenated;
                vec![
                    Entity::new(
                        &id,
                        &scheme,
                        config.switch.name.as_str(),
                        EntityConstraints::Switch,
                    ),
                    Entity::new(
                        &id,
                        &scheme,
                        config.number.name.as_str(),
                        EntityConstraints::Number {
                            min: config.number.min,
                            max: config.number.max,
                        },
                    ),
                    Entity::new(
                        &id,
                        &scheme,
                        config.text.name.as_str(),
                        EntityConstraints::Text {
                            max_len: BoundedText::MAX_LEN,
                        },
                    ),
                ]
            }
        };

        tracing::debug!(
            device = %id,
            profile = ?config.profile,
            entities = entities.len(),
            "Device built"
        );

        Self {
            id,
            info: config.device.clone(),
            profile: config.profile,
            entities,
            echo_light_commands: config.light.echo_commands,
        }
    }

    /// Returns the device id.
    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Returns the announced device description.
    #[must_use]
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Returns the profile the device was built from.
    #[must_use]
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Returns the entities in announcement order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns `true` if light commands are republished verbatim.
    #[must_use]
    pub fn echo_light_commands(&self) -> bool {
        self.echo_light_commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    #[test]
    fn light_profile_has_one_literal_entity() {
        let config = BridgeConfig::default().with_device_id("6xalj9");
        let device = Device::from_config(&config).unwrap();

        assert_eq!(device.id().as_str(), "6xalj9");
        assert_eq!(device.profile(), Profile::Light);
        assert_eq!(device.entities().len(), 1);

        let light = &device.entities()[0];
        assert_eq!(light.kind(), EntityKind::Light);
        assert_eq!(light.name(), "REGEBELEEGHT");
        assert_eq!(light.object_id(), "6xalj9_light");
        assert_eq!(light.topics().command, "homeassistant/light/6xalj9_light/set");
        assert!(device.echo_light_commands());
    }

    #[test]
    fn light_object_id_override() {
        let mut config = BridgeConfig::default();
        config.light.object_id = Some("porch".to_string());
        let device = Device::with_id(&config, DeviceId::parse("abc123").unwrap());
        assert_eq!(device.entities()[0].object_id(), "porch");
    }

    #[test]
    fn actuators_profile_order_and_constraints() {
        let mut config = BridgeConfig::default().with_profile(Profile::Actuators);
        config.number.min = -5;
        config.number.max = 5;
        let device = Device::with_id(&config, DeviceId::parse("abc123").unwrap());

        let kinds: Vec<_> = device.entities().iter().map(Entity::kind).collect();
        assert_eq!(
            kinds,
            [EntityKind::Switch, EntityKind::Number, EntityKind::Text]
        );
        assert_eq!(
            device.entities()[1].constraints(),
            EntityConstraints::Number { min: -5, max: 5 }
        );
        assert_eq!(
            device.entities()[2].constraints(),
            EntityConstraints::Text { max_len: 63 }
        );
    }

    #[test]
    fn generated_id_when_unpinned() {
        let device = Device::from_config(&BridgeConfig::default()).unwrap();
        assert_eq!(device.id().as_str().len(), DeviceId::LEN);
    }

    #[test]
    fn invalid_pinned_id_is_rejected() {
        let config = BridgeConfig::default().with_device_id("no way");
        assert!(Device::from_config(&config).is_err());
    }
}
