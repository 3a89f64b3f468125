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

//! WebSocket connectivity for the Rach broker.
//!
//! [`client::RachWebSocketClient`] is the public handle; it forwards typed
//! commands to [`handler::RachFeedHandler`], a single-writer actor in a
//! dedicated Tokio task that owns the socket, the correlation table, and all
//! topic registry writes.

use std::sync::Arc;

use serde_json::Value;

use self::error::RachWsError;

pub mod client;
pub mod enums;
pub mod error;
pub mod handler;
pub mod messages;
pub mod publisher;

/// Callback invoked with each data object pushed for a subscribed topic.
pub type TopicCallback = Arc<dyn Fn(Value) + Send + Sync>;

/// One-shot callback receiving the optional result payload of a service call.
pub type ServiceResultCallback = Box<dyn FnOnce(Option<Value>) + Send>;

/// One-shot callback invoked when a ping round trip completes.
pub type PingCallback = Box<dyn FnOnce() + Send>;

/// One-shot callback receiving the failure of a correlated request.
pub type ErrorCallback = Box<dyn FnOnce(RachWsError) + Send>;
