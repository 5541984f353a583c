// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ha-device-bridge [config.json]`
//!
//! Runs the bridge against the configured broker until Ctrl-C. Without a
//! configuration file the defaults are used.

use std::sync::Arc;

use ha_device_bridge::config::BridgeConfig;
use ha_device_bridge::protocol::{MqttConnectionBuilder, run_event_loop};
use ha_device_bridge::{Device, Dispatcher, PinLevelSink, StateStore, spawn_output_task};

/// Pin driven by the on/off flag.
const OUTPUT_PIN: u8 = 2;

#[tokio::main]
async fn main() -> ha_device_bridge::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => BridgeConfig::from_file(path)?,
        None => BridgeConfig::default(),
    };

    let device = Device::from_config(&config)?;
    tracing::info!(
        device = %device.id(),
        profile = ?device.profile(),
        host = %config.broker.host,
        port = config.broker.port,
        "Starting bridge"
    );

    let (transport, event_loop) =
        MqttConnectionBuilder::from_config(&config.broker, device.id()).build();
    let store = Arc::new(StateStore::new());

    let output = spawn_output_task(
        Arc::clone(&store),
        PinLevelSink::new(OUTPUT_PIN),
        config.output_period(),
    );

    let mut dispatcher = Dispatcher::new(transport.clone(), device, store);

    tokio::select! {
        () = run_event_loop(event_loop, &mut dispatcher, config.broker.reconnect_delay()) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            }
            tracing::info!("Shutting down");
        }
    }

    output.abort();
    if let Err(e) = transport.disconnect().await {
        tracing::debug!(error = %e, "Disconnect request not delivered");
    }

    Ok(())
}
