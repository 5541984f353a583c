// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound command interpretation.
//!
//! The [`CommandInterpreter`] turns a `(topic, payload)` pair into a partial
//! [`StateChange`] and the state topic to republish on. Decoding depends on
//! the entity kind owning the topic:
//!
//! | Kind   | Payload                         | Decoder            |
//! |--------|---------------------------------|--------------------|
//! | light  | JSON document, all keys optional | [`decode_light`]  |
//! | switch | `ON` / anything else            | [`decode_switch`]  |
//! | number | decimal integer, `atoi` leniency | [`decode_number`] |
//! | text   | UTF-8, truncated to 63 bytes    | [`decode_text`]    |
//!
//! # Examples
//!
//! ```
//! use ha_device_bridge::command::{CommandInterpreter, Interpretation};
//! use ha_device_bridge::entity::{Entity, EntityConstraints, ObjectIdScheme};
//! use ha_device_bridge::DeviceId;
//!
//! let id = DeviceId::parse("abc123").unwrap();
//! let switch = Entity::new(&id, &ObjectIdScheme::Concatenated, "Switch", EntityConstraints::Switch);
//! let interpreter = CommandInterpreter::new(&[switch]);
//!
//! let outcome = interpreter.interpret("homeassistant/switch/abc123switch/set", b"ON");
//! assert!(matches!(outcome, Interpretation::Apply { .. }));
//!
//! let outcome = interpreter.interpret("some/other/topic", b"ON");
//! assert!(matches!(outcome, Interpretation::Unmatched));
//! ```

mod light;
mod value;

pub use light::decode_light;
pub use value::{decode_number, decode_switch, decode_text};

use crate::entity::{Entity, EntityKind};
use crate::error::ParseError;
use crate::protocol::{Route, TopicRouter};
use crate::state::{DeviceState, StateChange};

/// Decodes a payload for an entity of `kind`.
///
/// # Errors
///
/// Returns `ParseError` if a light payload is not a JSON document. The other
/// kinds never fail.
pub fn decode(kind: EntityKind, payload: &[u8]) -> Result<StateChange, ParseError> {
    Ok(match kind {
        EntityKind::Light => StateChange::Light(decode_light(payload)?),
        EntityKind::Switch => StateChange::Power(decode_switch(payload)),
        EntityKind::Number => StateChange::Number(decode_number(payload)),
        EntityKind::Text => StateChange::Text(decode_text(payload)),
    })
}

/// Result of interpreting one inbound message.
#[derive(Debug)]
pub enum Interpretation<'a> {
    /// The topic is a command topic and the payload decoded.
    Apply {
        /// Route of the command topic.
        route: &'a Route,
        /// Partial update to apply.
        change: StateChange,
    },
    /// The topic is a command topic but the payload is unusable.
    Malformed {
        /// Route of the command topic.
        route: &'a Route,
        /// Why decoding failed.
        error: ParseError,
    },
    /// The topic is not a command topic of this device.
    Unmatched,
}

/// Decodes inbound commands for a fixed set of entities.
#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    router: TopicRouter,
}

impl CommandInterpreter {
    /// Creates an interpreter routing the command topics of `entities`.
    #[must_use]
    pub fn new(entities: &[Entity]) -> Self {
        Self {
            router: TopicRouter::from_entities(entities),
        }
    }

    /// Interprets a message without touching any state.
    pub fn interpret(&self, topic: &str, payload: &[u8]) -> Interpretation<'_> {
        let Some(route) = self.router.route(topic) else {
            return Interpretation::Unmatched;
        };

        match decode(route.kind, payload) {
            Ok(change) => Interpretation::Apply { route, change },
            Err(error) => Interpretation::Malformed { route, error },
        }
    }

    /// Computes the state that results from a message, as a pure function.
    ///
    /// Returns the new state and the state topic to republish on, or `None`
    /// if the topic is unmatched or the payload malformed.
    #[must_use]
    pub fn evaluate(
        &self,
        topic: &str,
        payload: &[u8],
        prior: &DeviceState,
    ) -> Option<(DeviceState, &str)> {
        match self.interpret(topic, payload) {
            Interpretation::Apply { route, change } => {
                let mut next = prior.clone();
                next.apply(&change);
                Some((next, route.state_topic.as_str()))
            }
            Interpretation::Malformed { .. } | Interpretation::Unmatched => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityConstraints, ObjectIdScheme};
    use crate::identity::DeviceId;
    use crate::types::{BoundedText, ChannelValue, PowerState};

    const LIGHT_SET: &str = "homeassistant/light/abc123_light/set";
    const SWITCH_SET: &str = "homeassistant/switch/abc123switch/set";
    const NUMBER_SET: &str = "homeassistant/number/abc123number/set";
    const TEXT_SET: &str = "homeassistant/text/abc123text/set";

    fn interpreter() -> CommandInterpreter {
        let id = DeviceId::parse("abc123").unwrap();
        let light = Entity::new(
            &id,
            &ObjectIdScheme::Literal("abc123_light".to_string()),
            "Light",
            EntityConstraints::Light {
                brightness_scale: 4095,
            },
        );
        let scheme = ObjectIdScheme::Concatenated;
        CommandInterpreter::new(&[
            light,
            Entity::new(&id, &scheme, "Switch", EntityConstraints::Switch),
            Entity::new(&id, &scheme, "Number", EntityConstraints::Number { min: 0, max: 100 }),
            Entity::new(&id, &scheme, "Text", EntityConstraints::Text { max_len: 63 }),
        ])
    }

    fn lit() -> DeviceState {
        let (state, _) = interpreter()
            .evaluate(
                LIGHT_SET,
                br#"{"state":"ON","color":{"r":100,"g":200,"b":300,"w":400},"brightness":50}"#,
                &DeviceState::new(),
            )
            .unwrap();
        state
    }

    #[test]
    fn brightness_only_keeps_color_and_power() {
        let prior = lit();
        let interp = interpreter();
        let (next, topic) = interp
            .evaluate(LIGHT_SET, br#"{"brightness":3000}"#, &prior)
            .unwrap();
        assert_eq!(topic, "homeassistant/light/abc123_light/state");
        assert_eq!(next.brightness(), ChannelValue::new(3000).unwrap());
        assert_eq!(next.color(), prior.color());
        assert_eq!(next.power(), prior.power());
    }

    #[test]
    fn absent_color_keeps_channels() {
        let prior = lit();
        let (next, _) = interpreter()
            .evaluate(LIGHT_SET, br#"{"state":"OFF"}"#, &prior)
            .unwrap();
        assert_eq!(next.color(), prior.color());
        assert_eq!(next.power(), PowerState::Off);
    }

    #[test]
    fn malformed_light_leaves_state_unchanged() {
        let interpreter = interpreter();
        let outcome = interpreter.interpret(LIGHT_SET, br#"{"state":"#);
        assert!(matches!(
            outcome,
            Interpretation::Malformed {
                error: ParseError::Json(_),
                ..
            }
        ));
        assert!(
            interpreter
                .evaluate(LIGHT_SET, br#"{"state":"#, &lit())
                .is_none()
        );
    }

    #[test]
    fn switch_literals() {
        let interpreter = interpreter();
        let prior = DeviceState::new();
        let (on, topic) = interpreter.evaluate(SWITCH_SET, b"ON", &prior).unwrap();
        assert_eq!(topic, "homeassistant/switch/abc123switch/state");
        assert!(on.power().is_on());

        for payload in [&b"OFF"[..], b"on", b"true", b""] {
            let (off, _) = interpreter.evaluate(SWITCH_SET, payload, &on).unwrap();
            assert!(!off.power().is_on());
        }
    }

    #[test]
    fn number_values() {
        let interpreter = interpreter();
        let (state, _) = interpreter
            .evaluate(NUMBER_SET, b"42", &DeviceState::new())
            .unwrap();
        assert_eq!(state.number(), 42);

        let (state, _) = interpreter.evaluate(NUMBER_SET, b"abc", &state).unwrap();
        assert_eq!(state.number(), 0);
    }

    #[test]
    fn text_truncated() {
        let long = "t".repeat(100);
        let (state, _) = interpreter()
            .evaluate(TEXT_SET, long.as_bytes(), &DeviceState::new())
            .unwrap();
        assert_eq!(state.text().len(), BoundedText::MAX_LEN);
    }

    #[test]
    fn unmatched_topics() {
        let interpreter = interpreter();
        assert!(matches!(
            interpreter.interpret("homeassistant/switch/abc123switch/state", b"ON"),
            Interpretation::Unmatched
        ));
        assert!(
            interpreter
                .evaluate("elsewhere", b"ON", &DeviceState::new())
                .is_none()
        );
    }

    #[test]
    fn decode_dispatches_by_kind() {
        assert_eq!(
            decode(EntityKind::Switch, b"ON").unwrap(),
            StateChange::Power(PowerState::On)
        );
        assert_eq!(
            decode(EntityKind::Number, b"-3").unwrap(),
            StateChange::Number(-3)
        );
        assert!(decode(EntityKind::Light, b"nope").is_err());
    }
}
