// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entities exposed to the hub and the topics they live on.
//!
//! Every entity owns three topics derived from the discovery prefix, its
//! kind and its object id:
//!
//! ```text
//! homeassistant/<kind>/<object_id>/config   discovery document (retained)
//! homeassistant/<kind>/<object_id>/set      commands from the hub
//! homeassistant/<kind>/<object_id>/state    state mirrored back (retained)
//! ```
//!
//! Topics are computed once, before the first subscription, and never change.

use std::fmt;

use crate::identity::DeviceId;

/// Top-level topic segment the hub watches for announceable entities.
pub const DISCOVERY_PREFIX: &str = "homeassistant";

/// The kind of a controllable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// RGBW light with brightness, JSON command schema.
    Light,
    /// On/off switch, bare `ON`/`OFF` payloads.
    Switch,
    /// Integer value, bare decimal payloads.
    Number,
    /// Short text value, bare UTF-8 payloads.
    Text,
}

impl EntityKind {
    /// Returns the hub component name, used as a topic segment.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Switch => "switch",
            Self::Number => "number",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an entity's object id is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectIdScheme {
    /// Device id directly followed by the kind, e.g. `6xalj9switch`.
    Concatenated,
    /// A fixed literal, used when the device exposes a single entity.
    Literal(String),
}

impl ObjectIdScheme {
    /// Derives the object id for an entity of `kind` on device `device_id`.
    #[must_use]
    pub fn object_id(&self, device_id: &DeviceId, kind: EntityKind) -> String {
        match self {
            Self::Concatenated => format!("{device_id}{kind}"),
            Self::Literal(literal) => literal.clone(),
        }
    }
}

/// The config, command and state topics of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSet {
    /// Discovery document topic.
    pub config: String,
    /// Inbound command topic.
    pub command: String,
    /// Outbound state topic.
    pub state: String,
}

impl TopicSet {
    /// Builds the topics for an entity under `prefix`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ha_device_bridge::entity::{EntityKind, TopicSet, DISCOVERY_PREFIX};
    ///
    /// let topics = TopicSet::new(DISCOVERY_PREFIX, EntityKind::Light, "6xalj9_light");
    /// assert_eq!(topics.config, "homeassistant/light/6xalj9_light/config");
    /// assert_eq!(topics.command, "homeassistant/light/6xalj9_light/set");
    /// assert_eq!(topics.state, "homeassistant/light/6xalj9_light/state");
    /// ```
    #[must_use]
    pub fn new(prefix: &str, kind: EntityKind, object_id: &str) -> Self {
        let base = format!("{prefix}/{kind}/{object_id}");
        Self {
            config: format!("{base}/config"),
            command: format!("{base}/set"),
            state: format!("{base}/state"),
        }
    }
}

/// Kind-specific limits announced to the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityConstraints {
    /// Light channels and brightness share a 0..=`brightness_scale` range.
    Light {
        /// Upper bound of every channel and of brightness.
        brightness_scale: u16,
    },
    /// Switch has no limits.
    Switch,
    /// Number is bounded by an inclusive range shown in the hub's UI.
    Number {
        /// Smallest value offered by the hub.
        min: i32,
        /// Largest value offered by the hub.
        max: i32,
    },
    /// Text is bounded by a maximum length in bytes.
    Text {
        /// Maximum length in bytes.
        max_len: usize,
    },
}

impl EntityConstraints {
    /// Returns the entity kind these constraints belong to.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Light { .. } => EntityKind::Light,
            Self::Switch => EntityKind::Switch,
            Self::Number { .. } => EntityKind::Number,
            Self::Text { .. } => EntityKind::Text,
        }
    }
}

/// One controllable unit exposed to the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    kind: EntityKind,
    name: String,
    object_id: String,
    topics: TopicSet,
    constraints: EntityConstraints,
}

impl Entity {
    /// Creates an entity, deriving its object id and topics.
    #[must_use]
    pub fn new(
        device_id: &DeviceId,
        scheme: &ObjectIdScheme,
        name: impl Into<String>,
        constraints: EntityConstraints,
    ) -> Self {
        let kind = constraints.kind();
        let object_id = scheme.object_id(device_id, kind);
        let topics = TopicSet::new(DISCOVERY_PREFIX, kind, &object_id);
        Self {
            kind,
            name: name.into(),
            object_id,
            topics,
            constraints,
        }
    }

    /// Returns the entity kind.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the object id, which doubles as the discovery `unique_id`.
    #[must_use]
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Returns the entity's topics.
    #[must_use]
    pub fn topics(&self) -> &TopicSet {
        &self.topics
    }

    /// Returns the kind-specific constraints.
    #[must_use]
    pub fn constraints(&self) -> EntityConstraints {
        self.constraints
    }
}
