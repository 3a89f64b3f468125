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

//! Publisher handle bound to a single Rach topic.

use serde_json::Value;
use ustr::Ustr;

use super::{client::RachWebSocketClient, error::RachWsResult};

/// Handle for publishing to one topic.
///
/// Returned by [`RachWebSocketClient::register_publisher`] with the topic
/// name resolved at registration time; later namespace changes on the client
/// do not move the handle.
#[derive(Clone, Debug)]
pub struct RachPublisher {
    client: RachWebSocketClient,
    topic: Ustr,
}

impl RachPublisher {
    pub(crate) const fn new(client: RachWebSocketClient, topic: Ustr) -> Self {
        Self { client, topic }
    }

    /// Returns the fully-qualified topic this handle publishes to.
    #[must_use]
    pub fn topic(&self) -> &str {
        self.topic.as_str()
    }

    /// Publishes data to the bound topic (fire-and-forget).
    ///
    /// Dropped with a warning until the broker has confirmed the publisher
    /// registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub fn publish(&self, data: Value) -> RachWsResult<()> {
        self.client.publish(self.topic.as_str(), data)
    }

    /// Removes the publisher registration for the bound topic.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub fn close(&self) -> RachWsResult<()> {
        self.client.unregister_publisher(self.topic.as_str())
    }
}
