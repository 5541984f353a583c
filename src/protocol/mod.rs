// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary with the publish/subscribe transport.
//!
//! The bridge core never manages the connection itself. It consumes a serial
//! stream of [`ChannelEvent`]s and issues two requests back through the
//! [`Transport`] trait: subscribe and publish.
//!
//! # Transports
//!
//! - [`MqttTransport`]: `rumqttc` client, with [`run_event_loop`] translating
//!   broker packets into [`ChannelEvent`]s (feature `mqtt`)

#[cfg(feature = "mqtt")]
mod mqtt;
mod topic_router;

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttConnectionBuilder, MqttTransport, run_event_loop, spawn_event_loop};
pub use topic_router::{Route, TopicRouter};

use std::fmt;

use crate::error::ProtocolError;

/// Requests the bridge issues to the transport.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Subscribes to a topic.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request cannot be queued.
    async fn subscribe(&self, topic: &str) -> Result<(), ProtocolError>;

    /// Publishes a payload to a topic.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request cannot be queued.
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool)
    -> Result<(), ProtocolError>;
}

/// An event delivered by the transport.
///
/// Events are delivered one at a time; the dispatcher never sees two
/// overlapping events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A session with the broker was established.
    Connected,
    /// The session with the broker was lost.
    Disconnected,
    /// A message arrived on a subscribed topic.
    Message {
        /// Topic the message arrived on.
        topic: String,
        /// Raw payload bytes.
        payload: Vec<u8>,
    },
    /// The broker acknowledged a subscription.
    Subscribed {
        /// Packet identifier of the acknowledged request.
        packet_id: u16,
    },
    /// The broker acknowledged a publish.
    Published {
        /// Packet identifier of the acknowledged request.
        packet_id: u16,
    },
    /// The transport reported an error.
    Error(TransportError),
}

/// Layer a transport error originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Socket or other I/O failure.
    Io,
    /// TLS handshake or record failure.
    Tls,
    /// Broker refused the connection.
    Refused,
    /// Network or flush timeout.
    Timeout,
    /// MQTT protocol state error.
    Protocol,
    /// Anything else.
    Other,
}

impl TransportErrorKind {
    /// Returns a short name for log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Io => "io",
            Self::Tls => "tls",
            Self::Refused => "refused",
            Self::Timeout => "timeout",
            Self::Protocol => "protocol",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic detail of a transport error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// Layer the error originated in.
    pub kind: TransportErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Code reported by the protocol or TLS stack, if any.
    pub stack_code: Option<i32>,
    /// OS error number captured from the socket, if any.
    pub socket_errno: Option<i32>,
}

impl TransportError {
    /// Creates an error with no numeric codes.
    #[must_use]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack_code: None,
            socket_errno: None,
        }
    }

    /// Sets the stack-level code.
    #[must_use]
    pub fn with_stack_code(mut self, code: i32) -> Self {
        self.stack_code = Some(code);
        self
    }

    /// Sets the socket errno.
    #[must_use]
    pub fn with_socket_errno(mut self, errno: i32) -> Self {
        self.socket_errno = Some(errno);
        self
    }

    /// Logs the full diagnostic chain. Codes are only logged when non-zero.
    pub fn log(&self) {
        tracing::error!(kind = %self.kind, message = %self.message, "Transport error");
        if let Some(code) = self.stack_code.filter(|code| *code != 0) {
            tracing::error!(code = format_args!("{code:#x}"), "Last error reported from stack");
        }
        if let Some(errno) = self.socket_errno.filter(|errno| *errno != 0) {
            tracing::error!(
                errno = format_args!("{errno:#x}"),
                description = %std::io::Error::from_raw_os_error(errno),
                "Last error captured as transport's socket errno"
            );
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)?;
        if let Some(code) = self.stack_code {
            write!(f, " (stack code {code:#x})")?;
        }
        if let Some(errno) = self.socket_errno {
            write!(f, " (errno {errno})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport recording every request.

    use parking_lot::Mutex;

    use super::Transport;
    use crate::error::ProtocolError;

    /// A request observed by [`RecordingTransport`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Request {
        Subscribe(String),
        Publish {
            topic: String,
            payload: Vec<u8>,
            retain: bool,
        },
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingTransport {
        requests: Mutex<Vec<Request>>,
    }

    impl RecordingTransport {
        pub(crate) fn requests(&self) -> Vec<Request> {
            self.requests.lock().clone()
        }

        pub(crate) fn subscriptions(&self) -> Vec<String> {
            self.requests()
                .into_iter()
                .filter_map(|request| match request {
                    Request::Subscribe(topic) => Some(topic),
                    Request::Publish { .. } => None,
                })
                .collect()
        }

        pub(crate) fn publishes(&self) -> Vec<(String, String, bool)> {
            self.requests()
                .into_iter()
                .filter_map(|request| match request {
                    Request::Publish {
                        topic,
                        payload,
                        retain,
                    } => Some((topic, String::from_utf8(payload).unwrap(), retain)),
                    Request::Subscribe(_) => None,
                })
                .collect()
        }

        pub(crate) fn clear(&self) {
            self.requests.lock().clear();
        }
    }

    impl Transport for RecordingTransport {
        async fn subscribe(&self, topic: &str) -> Result<(), ProtocolError> {
            self.requests
                .lock()
                .push(Request::Subscribe(topic.to_string()));
            Ok(())
        }

        async fn publish(
            &self,
            topic: &str,
            payload: Vec<u8>,
            retain: bool,
        ) -> Result<(), ProtocolError> {
            self.requests.lock().push(Request::Publish {
                topic: topic.to_string(),
                payload,
                retain,
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display_includes_codes() {
        let err = TransportError::new(TransportErrorKind::Io, "connection reset")
            .with_stack_code(0x8001)
            .with_socket_errno(104);
        assert_eq!(
            err.to_string(),
            "io error: connection reset (stack code 0x8001) (errno 104)"
        );
    }

    #[test]
    fn transport_error_display_without_codes() {
        let err = TransportError::new(TransportErrorKind::Timeout, "network timeout");
        assert_eq!(err.to_string(), "timeout error: network timeout");
        assert_eq!(err.stack_code, None);
        assert_eq!(err.socket_errno, None);
    }

    #[test]
    fn transport_error_log_does_not_panic() {
        TransportError::new(TransportErrorKind::Refused, "bad credentials")
            .with_stack_code(0)
            .with_socket_errno(111)
            .log();
    }
}
