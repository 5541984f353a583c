// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discovery document wire structures.
//!
//! Field order matches what the hub receives; serde emits struct fields in
//! declaration order.

use serde::Serialize;

/// Platform every entity is announced under.
pub(super) const PLATFORM: &str = "mqtt";

/// Abbreviated device block used by the light document.
#[derive(Debug, Serialize)]
pub(super) struct LightDevice<'a> {
    pub ids: [&'a str; 1],
    pub name: &'a str,
    pub mf: &'a str,
    pub mdl: &'a str,
    pub sw: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sn: Option<u64>,
}

/// Light entity document, JSON command schema.
#[derive(Debug, Serialize)]
pub(super) struct LightDocument<'a> {
    pub name: &'a str,
    pub command_topic: &'a str,
    pub state_topic: &'a str,
    pub unique_id: &'a str,
    pub platform: &'a str,
    pub device: LightDevice<'a>,
    pub schema: &'a str,
    pub brightness: bool,
    pub brightness_scale: u16,
    pub supported_color_modes: [&'a str; 1],
}

/// Long-form device block used by the switch, number and text documents.
#[derive(Debug, Serialize)]
pub(super) struct ActuatorDevice<'a> {
    pub identifiers: [&'a str; 1],
    pub name: &'a str,
    pub model: &'a str,
    pub manufacturer: &'a str,
}

/// Switch, number or text entity document.
#[derive(Debug, Serialize)]
pub(super) struct ActuatorDocument<'a> {
    pub name: &'a str,
    pub command_topic: &'a str,
    pub state_topic: &'a str,
    pub unique_id: &'a str,
    pub device: ActuatorDevice<'a>,
    pub platform: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
}
