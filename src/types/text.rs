// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length-bounded text value for the text entity.

use std::fmt;
use std::ops::Deref;

use crate::error::ValueError;

/// A UTF-8 string holding at most [`BoundedText::MAX_LEN`] bytes.
///
/// Inbound text is truncated rather than rejected. Truncation happens on a
/// character boundary, so a multi-byte character that straddles the limit is
/// dropped entirely.
///
/// # Examples
///
/// ```
/// use ha_device_bridge::types::BoundedText;
///
/// let text = BoundedText::truncating("hello");
/// assert_eq!(text.as_str(), "hello");
///
/// let long = "x".repeat(100);
/// assert_eq!(BoundedText::truncating(&long).len(), BoundedText::MAX_LEN);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BoundedText(String);

impl BoundedText {
    /// Maximum length in bytes.
    pub const MAX_LEN: usize = 63;

    /// Creates a bounded text value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::TextTooLong` if the value exceeds the maximum.
    pub fn new(value: impl Into<String>) -> Result<Self, ValueError> {
        let value = value.into();
        if value.len() > Self::MAX_LEN {
            return Err(ValueError::TextTooLong {
                max: Self::MAX_LEN,
                actual: value.len(),
            });
        }
        Ok(Self(value))
    }

    /// Creates a bounded text value, dropping any bytes past the maximum.
    #[must_use]
    pub fn truncating(value: &str) -> Self {
        if value.len() <= Self::MAX_LEN {
            return Self(value.to_string());
        }
        let mut end = Self::MAX_LEN;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        Self(value[..end].to_string())
    }

    /// Decodes raw payload bytes, replacing invalid UTF-8 sequences and then
    /// truncating.
    ///
    /// The limit applies to the decoded text. Each replacement character
    /// takes 3 bytes, so a payload that fits raw can still be cut.
    #[must_use]
    pub fn from_payload(payload: &[u8]) -> Self {
        Self::truncating(&String::from_utf8_lossy(payload))
    }

    /// Returns the text as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for BoundedText {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for BoundedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
