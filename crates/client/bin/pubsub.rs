// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Example binary demonstrating Rach publish/subscribe against a live broker.
//!
//! Connects to a broker, subscribes to a topic, registers a publisher for the
//! same topic, and publishes a counter once per second so pushed data loops
//! back through the subscription callback.
//!
//! # Environment Variables
//!
//! - `RACH_URL`: Broker WebSocket URL (default `ws://localhost:8080/rach`)
//! - `RACH_USERNAME`: Broker username (optional)
//! - `RACH_PASSWORD`: Broker password (optional)
//!
//! # Usage
//!
//! ```bash
//! cargo run -p rach-client --bin rach-pubsub --features demo
//! ```

use std::{env, time::Duration};

use rach_client::{
    common::credential::Credential,
    websocket::client::RachWebSocketClient,
};
use serde_json::json;
use tokio::{pin, signal};
use tracing::level_filters::LevelFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    let url = env::var("RACH_URL").unwrap_or_else(|_| "ws://localhost:8080/rach".to_string());
    let credential = match (env::var("RACH_USERNAME"), env::var("RACH_PASSWORD")) {
        (Ok(username), Ok(password)) => Some(Credential::new(username, password)),
        _ => None,
    };

    tracing::info!("Connecting to {url}");
    let mut client = RachWebSocketClient::new(url, credential, None);
    client.set_namespace("/demo");
    client.connect().await;
    client.wait_until_active(10.0).await?;
    tracing::info!("Connected");

    client.subscribe("counter", |data| {
        tracing::info!("Received push: {data}");
    })?;
    let publisher = client.register_publisher("counter")?;

    client.ping(
        || tracing::info!("Broker answered ping"),
        |e| tracing::error!("Ping failed: {e}"),
    );

    let sigint = signal::ctrl_c();
    pin!(sigint);

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    let mut count: u64 = 0;

    tracing::info!("Publishing... Press Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                count += 1;
                if let Err(e) = publisher.publish(json!({"count": count})) {
                    tracing::warn!("Publish failed: {e}");
                }
            }
            _ = &mut sigint => {
                tracing::info!("Received SIGINT, closing connection...");
                client.close().await;
                break;
            }
        }
    }

    tracing::info!("Rach pubsub example finished");
    Ok(())
}
