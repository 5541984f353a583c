// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration describing a single RGBW light on a local broker.
//!
//! # Examples
//!
//! ```
//! use ha_device_bridge::config::{BridgeConfig, Profile};
//!
//! let config = BridgeConfig::from_json(r#"{
//!     "profile": "actuators",
//!     "broker": { "host": "192.168.1.50" },
//!     "number": { "min": -10, "max": 10 }
//! }"#).unwrap();
//!
//! assert_eq!(config.profile, Profile::Actuators);
//! assert_eq!(config.broker.port, 1883);
//! assert_eq!(config.number.max, 10);
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Which set of entities the device exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// A single RGBW light.
    #[default]
    Light,
    /// A switch, a number and a text entity.
    Actuators,
}

/// Broker login.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Broker connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Broker host name or address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Optional login.
    pub credentials: Option<Credentials>,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u64,
    /// Client identifier; generated from the device id when absent.
    pub client_id: Option<String>,
    /// Delay before polling again after a connection error, in milliseconds.
    pub reconnect_delay_ms: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            credentials: None,
            keep_alive_secs: 30,
            client_id: None,
            reconnect_delay_ms: 5_000,
        }
    }
}

impl BrokerConfig {
    /// Returns the keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    /// Returns the reconnect delay.
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

/// Device description announced in every discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    /// Device display name.
    pub name: String,
    /// Manufacturer.
    pub manufacturer: String,
    /// Model.
    pub model: String,
    /// Software version.
    pub sw_version: String,
    /// Serial number, announced by the light profile only.
    pub serial_number: Option<u64>,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            name: "OngaroLight".to_string(),
            manufacturer: "Ongaro".to_string(),
            model: "blingbling".to_string(),
            sw_version: "alpha".to_string(),
            serial_number: Some(124_589),
        }
    }
}

/// Light entity options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LightOptions {
    /// Display name.
    pub name: String,
    /// Fixed object id; `<device_id>_light` when absent.
    pub object_id: Option<String>,
    /// Republish the raw command payload instead of the re-encoded state.
    pub echo_commands: bool,
}

impl Default for LightOptions {
    fn default() -> Self {
        Self {
            name: "REGEBELEEGHT".to_string(),
            object_id: None,
            echo_commands: true,
        }
    }
}

/// Switch entity options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SwitchOptions {
    /// Display name.
    pub name: String,
}

impl Default for SwitchOptions {
    fn default() -> Self {
        Self {
            name: "Switch".to_string(),
        }
    }
}

/// Number entity options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NumberOptions {
    /// Display name.
    pub name: String,
    /// Smallest value offered by the hub.
    pub min: i32,
    /// Largest value offered by the hub.
    pub max: i32,
}

impl Default for NumberOptions {
    fn default() -> Self {
        Self {
            name: "Number".to_string(),
            min: 0,
            max: 100,
        }
    }
}

/// Text entity options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    /// Display name.
    pub name: String,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            name: "Text".to_string(),
        }
    }
}

/// Complete bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Broker connection settings.
    pub broker: BrokerConfig,
    /// Entity set to expose.
    pub profile: Profile,
    /// Pinned device id; a random one is generated when absent.
    pub device_id: Option<String>,
    /// Device description.
    pub device: DeviceInfo,
    /// Light options (light profile).
    pub light: LightOptions,
    /// Switch options (actuators profile).
    pub switch: SwitchOptions,
    /// Number options (actuators profile).
    pub number: NumberOptions,
    /// Text options (actuators profile).
    pub text: TextOptions,
    /// Output sampling period in milliseconds.
    pub output_period_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            profile: Profile::default(),
            device_id: None,
            device: DeviceInfo::default(),
            light: LightOptions::default(),
            switch: SwitchOptions::default(),
            number: NumberOptions::default(),
            text: TextOptions::default(),
            output_period_ms: 100,
        }
    }
}

impl BridgeConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` for malformed JSON and
    /// `ConfigError::Invalid` if validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`from_json`](Self::from_json).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading configuration");
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broker.host.is_empty() {
            return Err(ConfigError::Invalid("broker.host is required".to_string()));
        }
        if self.number.min > self.number.max {
            return Err(ConfigError::Invalid(format!(
                "number.min ({}) is greater than number.max ({})",
                self.number.min, self.number.max
            )));
        }
        if self.output_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "output_period_ms must be positive".to_string(),
            ));
        }
        if let Some(object_id) = &self.light.object_id
            && (object_id.is_empty() || object_id.contains(['/', '+', '#']))
        {
            return Err(ConfigError::Invalid(format!(
                "light.object_id {object_id:?} is not a valid topic segment"
            )));
        }
        if let Some(id) = &self.device_id {
            crate::identity::DeviceId::parse(id)?;
        }
        Ok(())
    }

    /// Returns the output sampling period.
    #[must_use]
    pub fn output_period(&self) -> Duration {
        Duration::from_millis(self.output_period_ms)
    }

    /// Sets the broker host and port.
    #[must_use]
    pub fn with_broker(mut self, host: impl Into<String>, port: u16) -> Self {
        self.broker.host = host.into();
        self.broker.port = port;
        self
    }

    /// Sets the broker login.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.broker.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Sets the profile.
    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Pins the device id.
    #[must_use]
    pub fn with_device_id(mut self, id: impl Into<String>) -> Self {
        self.device_id = Some(id.into());
        self
    }

    /// Sets whether light commands are echoed verbatim to the state topic.
    #[must_use]
    pub fn with_light_echo(mut self, echo: bool) -> Self {
        self.light.echo_commands = echo;
        self
    }
}
