// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event dispatcher.
//!
//! The [`Dispatcher`] consumes transport events one at a time and drives the
//! rest of the bridge:
//!
//! ```text
//!                 Connected: subscribe every command topic, announce every entity
//!   ┌──────────────┐ ─────────────────────────────▶ ┌───────────┐
//!   │ Disconnected │                                │ Connected │ ◀─┐ Message: interpret,
//!   └──────────────┘ ◀───────────────────────────── └───────────┘ ──┘ apply, republish
//!                 Disconnected: nothing buffered
//! ```
//!
//! Acknowledgements are logged. Transport errors are logged with their full
//! diagnostic chain and never change the link state or stop the dispatcher.

use std::sync::Arc;

use crate::command::{CommandInterpreter, Interpretation};
use crate::device::Device;
use crate::discovery;
use crate::protocol::{ChannelEvent, Transport};
use crate::publisher::Publisher;
use crate::state::{DeviceState, StateStore};

/// Connection state as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No session with the broker (initial state).
    #[default]
    Disconnected,
    /// A session is established and subscriptions have been issued.
    Connected,
}

/// Routes transport events to the interpreter, the store and the publisher.
#[derive(Debug)]
pub struct Dispatcher<T> {
    transport: T,
    device: Device,
    interpreter: CommandInterpreter,
    publisher: Publisher,
    store: Arc<StateStore>,
    link: LinkState,
}

impl<T: Transport> Dispatcher<T> {
    /// Creates a dispatcher for `device`, writing to `store`.
    #[must_use]
    pub fn new(transport: T, device: Device, store: Arc<StateStore>) -> Self {
        let interpreter = CommandInterpreter::new(device.entities());
        let publisher = Publisher::new(device.echo_light_commands());
        Self {
            transport,
            device,
            interpreter,
            publisher,
            store,
            link: LinkState::Disconnected,
        }
    }

    /// Returns the current link state.
    #[must_use]
    pub fn link_state(&self) -> LinkState {
        self.link
    }

    /// Returns the device being exposed.
    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a snapshot of the current device state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.store.snapshot()
    }

    /// Handles one transport event.
    pub async fn handle(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected => self.on_connected().await,
            ChannelEvent::Disconnected => {
                if self.link == LinkState::Connected {
                    tracing::info!(device = %self.device.id(), "Disconnected from broker");
                }
                self.link = LinkState::Disconnected;
            }
            ChannelEvent::Message { topic, payload } => self.on_message(&topic, &payload).await,
            ChannelEvent::Subscribed { packet_id } => {
                tracing::debug!(packet_id, "Subscription acknowledged");
            }
            ChannelEvent::Published { packet_id } => {
                tracing::debug!(packet_id, "Publish acknowledged");
            }
            ChannelEvent::Error(error) => error.log(),
        }
    }

    async fn on_connected(&mut self) {
        if self.link == LinkState::Connected {
            tracing::debug!("Connect event while already connected");
        }
        tracing::info!(device = %self.device.id(), "Connected to broker");
        self.link = LinkState::Connected;

        for entity in self.device.entities() {
            let topic = &entity.topics().command;
            match self.transport.subscribe(topic).await {
                Ok(()) => tracing::debug!(topic = %topic, entity = %entity.kind(), "Subscribed"),
                Err(e) => tracing::warn!(topic = %topic, error = %e, "Failed to subscribe"),
            }
        }

        let announced = discovery::announce(&self.transport, &self.device).await;
        tracing::debug!(
            announced,
            entities = self.device.entities().len(),
            "Discovery documents published"
        );
    }

    async fn on_message(&self, topic: &str, payload: &[u8]) {
        match self.interpreter.interpret(topic, payload) {
            Interpretation::Apply { route, change } => {
                let snapshot = self.store.apply(&change);
                tracing::debug!(topic = %topic, entity = %route.kind, "Command applied");
                if let Err(e) = self
                    .publisher
                    .publish(
                        &self.transport,
                        &route.state_topic,
                        route.kind,
                        &snapshot,
                        payload,
                    )
                    .await
                {
                    tracing::warn!(topic = %route.state_topic, error = %e, "Failed to publish state");
                }
            }
            Interpretation::Malformed { route, error } => {
                tracing::warn!(
                    topic = %topic,
                    entity = %route.kind,
                    error = %error,
                    "Dropping malformed command"
                );
            }
            Interpretation::Unmatched => {
                tracing::trace!(topic = %topic, "Ignoring message on unknown topic");
            }
        }
    }
}
