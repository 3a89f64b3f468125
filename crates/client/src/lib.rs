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

//! Client runtime for the Rach publish/subscribe and RPC protocol.
//!
//! Rach multiplexes three interaction styles over one persistent WebSocket
//! connection to a broker:
//!
//! - **Publish/subscribe**: processes declare namespaced topics they publish to
//!   and subscribe to topics published by others, receiving pushed data through
//!   registered callbacks.
//! - **Service calls**: request/response invocations addressed by topic,
//!   correlated with their reply through a per-request matcher.
//! - **Liveness pings**: round-trip checks against the broker.
//!
//! The crate centers on [`websocket::client::RachWebSocketClient`], a handle
//! whose operations are synchronous and non-blocking: they resolve the topic
//! against the client namespace and forward a command to a single-writer
//! handler task that owns the socket, the correlation table, and the topic
//! registries. The handler keeps exactly one logical session alive, retrying
//! with a fixed delay until the client is closed, and re-announces confirmed
//! topics whenever a new session is established.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod common;
pub mod websocket;
