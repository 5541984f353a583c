// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identity.

use std::fmt;

use uuid::Uuid;

use crate::error::ConfigError;

/// Alphabet the random identifier is drawn from.
const ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Short random identifier of the running device instance.
///
/// The identifier is generated once at startup and namespaces every topic,
/// `unique_id` and discovery `identifiers` entry. It is stable for the life
/// of the process but not across restarts unless pinned in configuration.
///
/// # Examples
///
/// ```
/// use ha_device_bridge::DeviceId;
///
/// let id = DeviceId::generate();
/// assert_eq!(id.as_str().len(), DeviceId::LEN);
///
/// let fixed = DeviceId::parse("6xalj9").unwrap();
/// assert_eq!(fixed.to_string(), "6xalj9");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Length of a generated identifier.
    pub const LEN: usize = 6;

    /// Generates a new random identifier of lowercase letters and digits.
    #[must_use]
    pub fn generate() -> Self {
        // The leading bytes of a v4 UUID are all random. 256 % 36 == 4, so
        // the first four symbols come up 8/256 of the time, the rest 7/256.
        let random = Uuid::new_v4();
        let id = random
            .as_bytes()
            .iter()
            .take(Self::LEN)
            .map(|byte| char::from(ALPHABET[usize::from(*byte) % ALPHABET.len()]))
            .collect();
        Self(id)
    }

    /// Uses a fixed identifier, e.g. one pinned in configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the identifier is empty or contains
    /// anything other than ASCII letters and digits, since it becomes part of
    /// topic names.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ConfigError::Invalid(format!(
                "device id must be non-empty ASCII alphanumeric, got {value:?}"
            )));
        }
        Ok(Self(value.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
