// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device-side bridge exposing actuators to Home Assistant over MQTT.
//!
//! The bridge announces its entities through MQTT discovery, decodes the
//! commands the hub sends, keeps the device state and mirrors it back as
//! retained state messages.
//!
//! # Profiles
//!
//! - **Light**: a single RGBW light with brightness, JSON command schema
//! - **Actuators**: a switch, a number and a text entity, bare payloads
//!
//! # Architecture
//!
//! ```text
//! rumqttc EventLoop ──ChannelEvent──▶ Dispatcher ──▶ CommandInterpreter
//!        ▲                               │                 │
//!        │ subscribe / publish           ▼                 ▼
//!   MqttTransport ◀──── discovery, Publisher ◀──── StateStore ───▶ output task
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ha_device_bridge::config::BridgeConfig;
//! use ha_device_bridge::protocol::{MqttConnectionBuilder, run_event_loop};
//! use ha_device_bridge::{Device, Dispatcher, StateStore};
//!
//! #[tokio::main]
//! async fn main() -> ha_device_bridge::Result<()> {
//!     let config = BridgeConfig::default().with_broker("192.168.1.50", 1883);
//!     let device = Device::from_config(&config)?;
//!
//!     let (transport, event_loop) =
//!         MqttConnectionBuilder::from_config(&config.broker, device.id()).build();
//!     let store = Arc::new(StateStore::new());
//!     let mut dispatcher = Dispatcher::new(transport, device, store);
//!
//!     run_event_loop(event_loop, &mut dispatcher, config.broker.reconnect_delay()).await;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
mod device;
pub mod discovery;
pub mod dispatcher;
pub mod entity;
pub mod error;
pub mod identity;
pub mod output;
pub mod protocol;
pub mod publisher;
pub mod state;
pub mod types;

pub use config::{BridgeConfig, Profile};
pub use device::Device;
pub use dispatcher::{Dispatcher, LinkState};
pub use entity::{Entity, EntityKind};
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result, ValueError};
pub use identity::DeviceId;
pub use output::{OutputSink, PinLevelSink, spawn_output_task};
pub use protocol::{ChannelEvent, Transport, TransportError};
pub use state::{DeviceState, StateChange, StateStore};
pub use types::{BoundedText, ChannelValue, PowerState, Rgbw};
