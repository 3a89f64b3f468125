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

//! Enumerations for the Rach connection lifecycle and wire protocol.

use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Lifecycle state of the logical Rach session.
///
/// Stored as a `u8` behind an atomic shared between the client handle and the
/// handler task. `Closed` is terminal: once set the supervising loop has
/// exited and never reconnects.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumIter, EnumString)]
pub enum ConnectionMode {
    /// A transport session is being established.
    Connect,
    /// The socket is open and frames flow.
    Active,
    /// Between sessions, waiting out the reconnect delay.
    Reconnect,
    /// Terminal state after `close()` or a fatal authentication failure.
    Closed,
}

impl ConnectionMode {
    /// Returns the mode encoded as a `u8` for atomic storage.
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        match self {
            Self::Connect => 0,
            Self::Active => 1,
            Self::Reconnect => 2,
            Self::Closed => 3,
        }
    }

    /// Decodes a mode from its `u8` representation.
    ///
    /// Unknown values decode as `Closed`.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connect,
            1 => Self::Active,
            2 => Self::Reconnect,
            _ => Self::Closed,
        }
    }
}

/// Local acknowledgment state of a topic registration.
///
/// An entry is `Confirmed` only once the broker has acknowledged the
/// corresponding `addSub`/`addPub` request.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, AsRefStr)]
pub enum TopicState {
    /// Registration requested, awaiting broker acknowledgment.
    PendingAdd,
    /// Registration acknowledged by the broker.
    Confirmed,
    /// Removal requested, awaiting broker acknowledgment.
    PendingRemove,
}

/// Rach wire message type tags.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumIter, EnumString)]
pub enum RachMessageType {
    /// Authentication result pushed by the broker on session open.
    #[strum(serialize = "auth")]
    Auth,
    /// Error reply to a correlated request, carries `verbose` text.
    #[strum(serialize = "err")]
    Err,
    /// Success reply to a correlated request.
    #[strum(serialize = "ack")]
    Ack,
    /// Topic data, both outbound publishes and inbound pushes.
    #[strum(serialize = "pub")]
    Pub,
    /// Service call request or its result.
    #[strum(serialize = "service")]
    Service,
    /// Client-to-server liveness ping and its reply.
    #[strum(serialize = "cs_ping")]
    CsPing,
    /// Subscription registration request.
    #[strum(serialize = "addSub")]
    AddSub,
    /// Subscription removal request.
    #[strum(serialize = "rmSub")]
    RmSub,
    /// Publisher registration request.
    #[strum(serialize = "addPub")]
    AddPub,
    /// Publisher removal request.
    #[strum(serialize = "rmPub")]
    RmPub,
}

impl RachMessageType {
    /// Returns the wire tag for this message type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Err => "err",
            Self::Ack => "ack",
            Self::Pub => "pub",
            Self::Service => "service",
            Self::CsPing => "cs_ping",
            Self::AddSub => "addSub",
            Self::RmSub => "rmSub",
            Self::AddPub => "addPub",
            Self::RmPub => "rmPub",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    fn test_connection_mode_u8_round_trip() {
        for mode in ConnectionMode::iter() {
            assert_eq!(ConnectionMode::from_u8(mode.as_u8()), mode);
        }
    }

    #[rstest]
    fn test_connection_mode_unknown_u8_is_closed() {
        assert_eq!(ConnectionMode::from_u8(42), ConnectionMode::Closed);
    }

    #[rstest]
    #[case(RachMessageType::Auth, "auth")]
    #[case(RachMessageType::Err, "err")]
    #[case(RachMessageType::Ack, "ack")]
    #[case(RachMessageType::Pub, "pub")]
    #[case(RachMessageType::Service, "service")]
    #[case(RachMessageType::CsPing, "cs_ping")]
    #[case(RachMessageType::AddSub, "addSub")]
    #[case(RachMessageType::RmSub, "rmSub")]
    #[case(RachMessageType::AddPub, "addPub")]
    #[case(RachMessageType::RmPub, "rmPub")]
    fn test_message_type_wire_tags(#[case] msg_type: RachMessageType, #[case] tag: &str) {
        assert_eq!(msg_type.as_str(), tag);
        assert_eq!(RachMessageType::from_str(tag).unwrap(), msg_type);
    }

    #[rstest]
    fn test_message_type_unknown_tag() {
        assert!(RachMessageType::from_str("ss_ping").is_err());
    }
}
