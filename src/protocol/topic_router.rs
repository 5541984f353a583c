// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command topic routing.
//!
//! The [`TopicRouter`] maps each entity's command topic to the entity kind
//! that decodes it and the state topic its result is mirrored to. The table
//! is built once from the device's entities and never changes.
//!
//! ```text
//! MQTT Message: homeassistant/switch/6xalj9switch/set → ON
//!                     ↓
//!             TopicRouter.route()
//!                     ↓
//!     Route { kind: Switch, state_topic: ".../state" }
//!                     ↓
//!         switch decoder → StateStore → state publish
//! ```

use std::collections::HashMap;

use crate::entity::{Entity, EntityKind};

/// Destination of a command topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Kind of the entity owning the command topic.
    pub kind: EntityKind,
    /// State topic to republish on after the command is applied.
    pub state_topic: String,
}

/// Lookup table from command topic to [`Route`].
#[derive(Debug, Clone, Default)]
pub struct TopicRouter {
    routes: HashMap<String, Route>,
}

impl TopicRouter {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router with one route per entity.
    #[must_use]
    pub fn from_entities(entities: &[Entity]) -> Self {
        let mut router = Self::new();
        for entity in entities {
            router.register(entity);
        }
        router
    }

    /// Registers an entity's command topic.
    ///
    /// If a previous registration exists for this topic, it is replaced.
    pub fn register(&mut self, entity: &Entity) {
        let topics = entity.topics();
        tracing::debug!(
            topic = %topics.command,
            entity = %entity.kind(),
            "Registering command topic"
        );
        self.routes.insert(
            topics.command.clone(),
            Route {
                kind: entity.kind(),
                state_topic: topics.state.clone(),
            },
        );
    }

    /// Looks up the route for an inbound topic.
    ///
    /// Returns `None` for topics that are not command topics of this device.
    #[must_use]
    pub fn route(&self, topic: &str) -> Option<&Route> {
        let route = self.routes.get(topic);
        if route.is_none() {
            tracing::trace!(topic = %topic, "No command route for topic");
        }
        route
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
