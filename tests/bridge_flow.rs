// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end dispatcher flow through the public API with an in-memory
//! transport.

use std::sync::Arc;
use std::time::Duration;

use ha_device_bridge::config::{BridgeConfig, Profile};
use ha_device_bridge::{
    ChannelEvent, Device, DeviceState, Dispatcher, LinkState, OutputSink, PowerState,
    ProtocolError, StateStore, Transport, spawn_output_task,
};
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sent {
    Subscribe(String),
    Publish(String, Vec<u8>, bool),
}

#[derive(Debug, Default, Clone)]
struct MemoryTransport {
    sent: Arc<Mutex<Vec<Sent>>>,
}

impl MemoryTransport {
    fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock())
    }
}

impl Transport for MemoryTransport {
    async fn subscribe(&self, topic: &str) -> Result<(), ProtocolError> {
        self.sent.lock().push(Sent::Subscribe(topic.to_string()));
        Ok(())
    }

    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        retain: bool,
    ) -> Result<(), ProtocolError> {
        self.sent
            .lock()
            .push(Sent::Publish(topic.to_string(), payload, retain));
        Ok(())
    }
}

/// Transport whose every request fails.
struct BrokenTransport;

impl Transport for BrokenTransport {
    async fn subscribe(&self, _topic: &str) -> Result<(), ProtocolError> {
        Err(ProtocolError::ChannelClosed("offline".to_string()))
    }

    async fn publish(
        &self,
        _topic: &str,
        _payload: Vec<u8>,
        _retain: bool,
    ) -> Result<(), ProtocolError> {
        Err(ProtocolError::ChannelClosed("offline".to_string()))
    }
}

fn build(profile: Profile, echo: bool) -> (Dispatcher<MemoryTransport>, MemoryTransport, Arc<StateStore>) {
    let config = BridgeConfig::default()
        .with_profile(profile)
        .with_device_id("6xalj9")
        .with_light_echo(echo);
    let device = Device::from_config(&config).unwrap();
    let transport = MemoryTransport::default();
    let store = Arc::new(StateStore::new());
    let dispatcher = Dispatcher::new(transport.clone(), device, Arc::clone(&store));
    (dispatcher, transport, store)
}

fn command(topic: &str, payload: &[u8]) -> ChannelEvent {
    ChannelEvent::Message {
        topic: topic.to_string(),
        payload: payload.to_vec(),
    }
}

const LIGHT_SET: &str = "homeassistant/light/6xalj9_light/set";
const LIGHT_STATE: &str = "homeassistant/light/6xalj9_light/state";

#[tokio::test]
async fn light_session() {
    let (mut dispatcher, transport, store) = build(Profile::Light, false);

    dispatcher.handle(ChannelEvent::Connected).await;
    let sent = transport.take();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], Sent::Subscribe(LIGHT_SET.to_string()));
    let Sent::Publish(topic, config, retain) = &sent[1] else {
        panic!("expected discovery publish, got {:?}", sent[1]);
    };
    assert_eq!(topic, "homeassistant/light/6xalj9_light/config");
    assert!(*retain);
    let config: Value = serde_json::from_slice(config).unwrap();
    assert_eq!(config["command_topic"], LIGHT_SET);
    assert_eq!(config["device"]["ids"][0], "6xalj9");
    assert_eq!(config["brightness_scale"], 4095);

    dispatcher
        .handle(command(
            LIGHT_SET,
            br#"{"state":"ON","color":{"r":4095,"g":10,"b":20,"w":30},"brightness":100}"#,
        ))
        .await;
    dispatcher
        .handle(command(LIGHT_SET, br#"{"brightness":3000}"#))
        .await;

    let state = store.snapshot();
    assert_eq!(state.power(), PowerState::On);
    assert_eq!(state.color().r.value(), 4095);
    assert_eq!(state.color().w.value(), 30);
    assert_eq!(state.brightness().value(), 3000);

    let sent = transport.take();
    let Some(Sent::Publish(topic, payload, true)) = sent.last() else {
        panic!("expected retained state publish, got {sent:?}");
    };
    assert_eq!(topic, LIGHT_STATE);
    let published: Value = serde_json::from_slice(payload).unwrap();
    assert_eq!(published["state"], "ON");
    assert_eq!(published["color"]["g"], 10);
    assert_eq!(published["brightness"], 3000);
}

#[tokio::test]
async fn published_light_state_replays_to_same_state() {
    let (mut dispatcher, transport, store) = build(Profile::Light, false);
    dispatcher
        .handle(command(
            LIGHT_SET,
            br#"{"state":"ON","color":{"r":1,"g":2,"b":3,"w":4},"brightness":5}"#,
        ))
        .await;
    let before = store.snapshot();
    let Some(Sent::Publish(_, payload, _)) = transport.take().pop() else {
        panic!("no state published");
    };

    dispatcher.handle(command(LIGHT_SET, &payload)).await;
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn actuator_session_with_reconnect() {
    let (mut dispatcher, transport, store) = build(Profile::Actuators, false);

    dispatcher.handle(ChannelEvent::Connected).await;
    let first = transport.take();
    let subscriptions = first
        .iter()
        .filter(|sent| matches!(sent, Sent::Subscribe(_)))
        .count();
    assert_eq!(subscriptions, 3);
    assert_eq!(first.len(), 6);

    dispatcher
        .handle(command("homeassistant/switch/6xalj9switch/set", b"ON"))
        .await;
    dispatcher
        .handle(command("homeassistant/number/6xalj9number/set", b"17"))
        .await;
    dispatcher
        .handle(command("homeassistant/text/6xalj9text/set", "héllo".as_bytes()))
        .await;

    assert_eq!(
        transport.take(),
        [
            Sent::Publish(
                "homeassistant/switch/6xalj9switch/state".to_string(),
                b"ON".to_vec(),
                true
            ),
            Sent::Publish(
                "homeassistant/number/6xalj9number/state".to_string(),
                b"17".to_vec(),
                true
            ),
            Sent::Publish(
                "homeassistant/text/6xalj9text/state".to_string(),
                "héllo".as_bytes().to_vec(),
                true
            ),
        ]
    );

    dispatcher.handle(ChannelEvent::Disconnected).await;
    assert_eq!(dispatcher.link_state(), LinkState::Disconnected);
    dispatcher.handle(ChannelEvent::Connected).await;
    assert_eq!(transport.take(), first);

    // State survives the reconnect
    let state = store.snapshot();
    assert_eq!(state.power(), PowerState::On);
    assert_eq!(state.number(), 17);
    assert_eq!(state.text().as_str(), "héllo");
}

#[tokio::test]
async fn failing_transport_never_stops_dispatch() {
    let config = BridgeConfig::default()
        .with_profile(Profile::Actuators)
        .with_device_id("6xalj9");
    let device = Device::from_config(&config).unwrap();
    let store = Arc::new(StateStore::new());
    let mut dispatcher = Dispatcher::new(BrokenTransport, device, Arc::clone(&store));

    dispatcher.handle(ChannelEvent::Connected).await;
    assert_eq!(dispatcher.link_state(), LinkState::Connected);

    dispatcher
        .handle(command("homeassistant/number/6xalj9number/set", b"-8"))
        .await;
    assert_eq!(store.snapshot().number(), -8);
}

#[derive(Clone, Default)]
struct LastSeen(Arc<Mutex<Option<DeviceState>>>);

impl OutputSink for LastSeen {
    fn drive(&mut self, state: &DeviceState) {
        *self.0.lock() = Some(state.clone());
    }
}

#[tokio::test(start_paused = true)]
async fn output_task_follows_commands() {
    let (mut dispatcher, _transport, store) = build(Profile::Actuators, false);
    let sink = LastSeen::default();
    let task = spawn_output_task(Arc::clone(&store), sink.clone(), Duration::from_millis(100));

    dispatcher
        .handle(command("homeassistant/switch/6xalj9switch/set", b"ON"))
        .await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    let seen = sink.0.lock().clone().unwrap();
    assert_eq!(seen.power(), PowerState::On);

    task.abort();
}
