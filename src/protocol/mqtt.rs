// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT transport backed by `rumqttc`.
//!
//! [`MqttTransport`] queues subscribe and publish requests on the client.
//! [`spawn_event_loop`] polls the connection in a background task and
//! forwards every relevant packet as a [`ChannelEvent`].
//! [`run_event_loop`] feeds those events to a [`Dispatcher`], one at a time.
//!
//! The poll task never waits on the dispatcher. Requests queued while an
//! event is being handled are drained by the next poll, so the client's
//! bounded request queue cannot fill up behind a burst of commands.
//!
//! Reconnection is left to `rumqttc`: after a connection error the poll
//! task waits the reconnect delay and polls again, which reconnects.

use std::error::Error as StdError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::BrokerConfig;
use crate::dispatcher::Dispatcher;
use crate::error::ProtocolError;
use crate::identity::DeviceId;
use crate::protocol::{ChannelEvent, Transport, TransportError, TransportErrorKind};

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Capacity of the client's request queue.
const REQUEST_CAPACITY: usize = 32;

/// Transport issuing requests through a `rumqttc` client.
///
/// Every request uses QoS 1.
#[derive(Debug, Clone)]
pub struct MqttTransport {
    client: AsyncClient,
}

impl MqttTransport {
    /// Wraps an existing client.
    #[must_use]
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }

    /// Queues a disconnect request.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Mqtt` if the request cannot be queued.
    pub async fn disconnect(&self) -> Result<(), ProtocolError> {
        self.client.disconnect().await.map_err(ProtocolError::Mqtt)
    }
}

impl Transport for MqttTransport {
    async fn subscribe(&self, topic: &str) -> Result<(), ProtocolError> {
        self.client
            .subscribe(topic, QoS::AtLeastOnce)
            .await
            .map_err(ProtocolError::Mqtt)
    }

    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        retain: bool,
    ) -> Result<(), ProtocolError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, retain, payload)
            .await
            .map_err(ProtocolError::Mqtt)
    }
}

/// Builder for an MQTT client and its event loop.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ha_device_bridge::protocol::MqttConnectionBuilder;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (transport, event_loop) = MqttConnectionBuilder::new()
///     .broker("mqtt://192.168.1.50:1883")?
///     .credentials("user", "password")
///     .keep_alive(Duration::from_secs(60))
///     .build();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MqttConnectionBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    password: Option<String>,
    client_id: Option<String>,
    keep_alive: Duration,
}

impl Default for MqttConnectionBuilder {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            username: None,
            password: None,
            client_id: None,
            keep_alive: Duration::from_secs(30),
        }
    }
}

impl MqttConnectionBuilder {
    /// Creates a builder for `localhost:1883`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from broker settings.
    ///
    /// Without a configured client id, `ha_bridge_<device_id>` is used.
    #[must_use]
    pub fn from_config(config: &BrokerConfig, device_id: &DeviceId) -> Self {
        let mut builder = Self::new()
            .host(config.host.as_str())
            .port(config.port)
            .keep_alive(config.keep_alive())
            .client_id(
                config
                    .client_id
                    .clone()
                    .unwrap_or_else(|| format!("ha_bridge_{device_id}")),
            );
        if let Some(credentials) = &config.credentials {
            builder = builder.credentials(
                credentials.username.as_str(),
                credentials.password.as_str(),
            );
        }
        builder
    }

    /// Sets host and port from a broker URL such as `mqtt://host:1883`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidAddress` if the port is not a number.
    pub fn broker(self, url: &str) -> Result<Self, ProtocolError> {
        let (host, port) = parse_mqtt_url(url)?;
        Ok(self.host(host).port(port))
    }

    /// Sets the broker host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the broker port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets authentication credentials for the broker.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets a custom client ID.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = duration;
        self
    }

    /// Creates the client and its event loop.
    ///
    /// Nothing touches the network until the event loop is polled.
    #[must_use]
    pub fn build(self) -> (MqttTransport, EventLoop) {
        let client_id = self.client_id.unwrap_or_else(|| {
            let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
            format!("ha_bridge_{}_{}", std::process::id(), counter)
        });

        tracing::debug!(
            host = %self.host,
            port = self.port,
            client_id = %client_id,
            "Creating MQTT client"
        );

        let mut options = MqttOptions::new(client_id, self.host, self.port);
        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);

        if let (Some(username), Some(password)) = (self.username, self.password) {
            options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);
        (MqttTransport::new(client), event_loop)
    }
}

/// Parses an MQTT URL into host and port.
fn parse_mqtt_url(url: &str) -> Result<(String, u16), ProtocolError> {
    let url = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port) = if let Some((h, p)) = url.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("Invalid port: {p}")))?;
        (h.to_string(), port)
    } else {
        (url.to_string(), 1883)
    };

    if host.is_empty() {
        return Err(ProtocolError::InvalidAddress("host is required".to_string()));
    }

    Ok((host, port))
}

/// Translates a polled packet into a channel event, if it is one.
fn translate(event: Event) -> Option<ChannelEvent> {
    match event {
        Event::Incoming(Packet::ConnAck(_)) => Some(ChannelEvent::Connected),
        Event::Incoming(Packet::Publish(publish)) => Some(ChannelEvent::Message {
            topic: publish.topic,
            payload: publish.payload.to_vec(),
        }),
        Event::Incoming(Packet::SubAck(ack)) => Some(ChannelEvent::Subscribed {
            packet_id: ack.pkid,
        }),
        Event::Incoming(Packet::PubAck(ack)) => Some(ChannelEvent::Published {
            packet_id: ack.pkid,
        }),
        Event::Incoming(Packet::Disconnect) => Some(ChannelEvent::Disconnected),
        Event::Incoming(_) | Event::Outgoing(_) => None,
    }
}

/// Finds the OS error number anywhere in an error's source chain.
fn socket_errno(error: &(dyn StdError + 'static)) -> Option<i32> {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(io) = err.downcast_ref::<std::io::Error>()
            && let Some(code) = io.raw_os_error()
        {
            return Some(code);
        }
        current = err.source();
    }
    None
}

/// Converts a connection error into its diagnostic form.
fn classify(error: &ConnectionError) -> TransportError {
    let kind = match error {
        ConnectionError::Io(_) => TransportErrorKind::Io,
        ConnectionError::Tls(_) => TransportErrorKind::Tls,
        ConnectionError::ConnectionRefused(_) => TransportErrorKind::Refused,
        ConnectionError::NetworkTimeout | ConnectionError::FlushTimeout => {
            TransportErrorKind::Timeout
        }
        ConnectionError::MqttState(_) | ConnectionError::NotConnAck(_) => {
            TransportErrorKind::Protocol
        }
        _ => TransportErrorKind::Other,
    };

    let mut diagnostic = TransportError::new(kind, error.to_string());
    if let ConnectionError::ConnectionRefused(code) = error {
        diagnostic = diagnostic.with_stack_code(i32::from(*code as u8));
    }
    if let Some(errno) = socket_errno(error) {
        diagnostic = diagnostic.with_socket_errno(errno);
    }
    diagnostic
}

/// Spawns a task polling `event_loop` and forwarding its events.
///
/// A connection error is forwarded as [`ChannelEvent::Error`] followed by
/// [`ChannelEvent::Disconnected`]; polling resumes after `reconnect_delay`.
/// The task ends once the receiver is dropped.
///
/// The channel is unbounded so forwarding never waits on the consumer.
#[must_use]
pub fn spawn_event_loop(
    mut event_loop: EventLoop,
    reconnect_delay: Duration,
) -> (mpsc::UnboundedReceiver<ChannelEvent>, JoinHandle<()>) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        loop {
            match event_loop.poll().await {
                Ok(event) => {
                    tracing::trace!(?event, "MQTT event");
                    if let Some(event) = translate(event)
                        && event_tx.send(event).is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    let error = ChannelEvent::Error(classify(&e));
                    if event_tx.send(error).is_err()
                        || event_tx.send(ChannelEvent::Disconnected).is_err()
                    {
                        break;
                    }
                    tokio::time::sleep(reconnect_delay).await;
                }
            }
        }
        tracing::debug!("MQTT event loop stopped");
    });

    (event_rx, handle)
}

/// Aborts the poll task when dropped.
struct PollTask(JoinHandle<()>);

impl Drop for PollTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Drives `event_loop` and delivers its events to `dispatcher` serially.
///
/// Runs until the poll task stops. Dropping the returned future stops the
/// poll task as well.
pub async fn run_event_loop<T: Transport>(
    event_loop: EventLoop,
    dispatcher: &mut Dispatcher<T>,
    reconnect_delay: Duration,
) {
    let (mut events, handle) = spawn_event_loop(event_loop, reconnect_delay);
    let _poll = PollTask(handle);

    while let Some(event) = events.recv().await {
        dispatcher.handle(event).await;
    }
}

#[cfg(test)]
mod tests {
    use rumqttc::{ConnAck, ConnectReturnCode, Publish, SubAck};

    use super::*;

    #[test]
    fn parse_mqtt_url_with_port() {
        let (host, port) = parse_mqtt_url("mqtt://192.168.1.50:1883").unwrap();
        assert_eq!(host, "192.168.1.50");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_mqtt_url_default_port() {
        let (host, port) = parse_mqtt_url("broker.lan").unwrap();
        assert_eq!(host, "broker.lan");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_mqtt_url_rejects_bad_input() {
        assert!(matches!(
            parse_mqtt_url("tcp://broker:port"),
            Err(ProtocolError::InvalidAddress(_))
        ));
        assert!(parse_mqtt_url("mqtt://:1883").is_err());
    }

    #[test]
    fn builder_from_config() {
        let mut config = BrokerConfig {
            host: "10.1.1.1".to_string(),
            port: 1884,
            ..BrokerConfig::default()
        };
        config.credentials = Some(crate::config::Credentials {
            username: "user".to_string(),
            password: "pass".to_string(),
        });
        let id = DeviceId::parse("abc123").unwrap();
        let builder = MqttConnectionBuilder::from_config(&config, &id);

        assert_eq!(builder.host, "10.1.1.1");
        assert_eq!(builder.port, 1884);
        assert_eq!(builder.client_id.as_deref(), Some("ha_bridge_abc123"));
        assert_eq!(builder.username.as_deref(), Some("user"));
        assert_eq!(builder.keep_alive, Duration::from_secs(30));
    }

    #[test]
    fn translates_incoming_packets() {
        let connack = Event::Incoming(Packet::ConnAck(ConnAck::new(
            ConnectReturnCode::Success,
            false,
        )));
        assert_eq!(translate(connack), Some(ChannelEvent::Connected));

        let publish = Event::Incoming(Packet::Publish(Publish::new(
            "homeassistant/switch/abc123switch/set",
            QoS::AtLeastOnce,
            "ON",
        )));
        assert_eq!(
            translate(publish),
            Some(ChannelEvent::Message {
                topic: "homeassistant/switch/abc123switch/set".to_string(),
                payload: b"ON".to_vec(),
            })
        );

        let suback = Event::Incoming(Packet::SubAck(SubAck::new(7, Vec::new())));
        assert_eq!(
            translate(suback),
            Some(ChannelEvent::Subscribed { packet_id: 7 })
        );

        assert_eq!(translate(Event::Incoming(Packet::PingResp)), None);
    }

    #[test]
    fn classifies_io_with_errno() {
        let io = std::io::Error::from_raw_os_error(111);
        let diagnostic = classify(&ConnectionError::Io(io));
        assert_eq!(diagnostic.kind, TransportErrorKind::Io);
        assert_eq!(diagnostic.socket_errno, Some(111));
        assert_eq!(diagnostic.stack_code, None);
    }

    #[test]
    fn classifies_refusal_with_code() {
        let diagnostic = classify(&ConnectionError::ConnectionRefused(
            ConnectReturnCode::BadUserNamePassword,
        ));
        assert_eq!(diagnostic.kind, TransportErrorKind::Refused);
        assert_eq!(diagnostic.stack_code, Some(4));
        assert_eq!(diagnostic.socket_errno, None);
    }

    #[tokio::test]
    async fn poll_task_forwards_connection_errors() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let (_transport, event_loop) = MqttConnectionBuilder::new()
            .host("127.0.0.1")
            .port(port)
            .build();

        let (mut events, handle) = spawn_event_loop(event_loop, Duration::from_millis(10));
        let Some(ChannelEvent::Error(error)) = events.recv().await else {
            panic!("expected a connection error first");
        };
        assert_eq!(error.kind, TransportErrorKind::Io);
        assert_eq!(events.recv().await, Some(ChannelEvent::Disconnected));

        // The task stops on its next send once nobody listens.
        drop(events);
        handle.await.unwrap();
    }

    #[test]
    fn classifies_timeout() {
        let diagnostic = classify(&ConnectionError::NetworkTimeout);
        assert_eq!(diagnostic.kind, TransportErrorKind::Timeout);
    }
}
