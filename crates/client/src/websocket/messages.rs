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

//! Data structures for Rach wire frames.
//!
//! Every frame, inbound or outbound, is the same envelope: a `type` tag, an
//! optional correlation `matcher`, and an optional `data` payload. Inbound
//! `err` frames additionally carry a human-readable `verbose` message.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use ustr::Ustr;

use super::{enums::RachMessageType, error::RachWsError};

/// Symmetric Rach request/response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RachWsFrame {
    /// Message type tag; kept as a raw string so unknown inbound tags can be
    /// ignored instead of failing the whole frame.
    #[serde(rename = "type", default)]
    pub msg_type: Option<String>,
    /// Correlation matcher pairing a request with its reply.
    #[serde(default)]
    pub matcher: Option<String>,
    /// Type-specific payload.
    #[serde(default)]
    pub data: Option<Value>,
    /// Human-readable error text, present on inbound `err` frames only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<String>,
}

impl RachWsFrame {
    /// Creates an outbound frame for the given type, matcher, and payload.
    #[must_use]
    pub fn outbound(msg_type: RachMessageType, matcher: String, data: Option<Value>) -> Self {
        Self {
            msg_type: Some(msg_type.as_str().to_string()),
            matcher: Some(matcher),
            data,
            verbose: None,
        }
    }

    /// Creates an `addSub` request frame.
    #[must_use]
    pub fn add_sub(matcher: String, topic: Ustr) -> Self {
        Self::outbound(RachMessageType::AddSub, matcher, Some(topic_payload(topic)))
    }

    /// Creates an `rmSub` request frame.
    #[must_use]
    pub fn rm_sub(matcher: String, topic: Ustr) -> Self {
        Self::outbound(RachMessageType::RmSub, matcher, Some(topic_payload(topic)))
    }

    /// Creates an `addPub` request frame.
    #[must_use]
    pub fn add_pub(matcher: String, topic: Ustr) -> Self {
        Self::outbound(RachMessageType::AddPub, matcher, Some(topic_payload(topic)))
    }

    /// Creates an `rmPub` request frame.
    #[must_use]
    pub fn rm_pub(matcher: String, topic: Ustr) -> Self {
        Self::outbound(RachMessageType::RmPub, matcher, Some(topic_payload(topic)))
    }

    /// Creates a fire-and-forget `pub` frame carrying topic data.
    #[must_use]
    pub fn publish(matcher: String, topic: Ustr, data: Value) -> Self {
        Self::outbound(
            RachMessageType::Pub,
            matcher,
            Some(json!({"topic": topic.as_str(), "data": data})),
        )
    }

    /// Creates a `service` request frame.
    #[must_use]
    pub fn service(matcher: String, topic: Ustr, args: Value) -> Self {
        Self::outbound(
            RachMessageType::Service,
            matcher,
            Some(json!({"topic": topic.as_str(), "args": args})),
        )
    }

    /// Creates a `cs_ping` request frame (no payload).
    #[must_use]
    pub fn ping(matcher: String) -> Self {
        Self::outbound(RachMessageType::CsPing, matcher, None)
    }
}

fn topic_payload(topic: Ustr) -> Value {
    json!({"topic": topic.as_str()})
}

/// Parses a raw inbound text frame into a [`RachWsFrame`].
///
/// # Errors
///
/// Returns an error if the text is not a valid JSON envelope.
pub fn parse_ws_frame(text: &str) -> Result<RachWsFrame, RachWsError> {
    serde_json::from_str(text).map_err(|e| RachWsError::Json(e.to_string()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_serialize_add_sub() {
        let frame = RachWsFrame::add_sub("1".to_string(), Ustr::from("/robot/arm"));
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            value,
            json!({"type": "addSub", "matcher": "1", "data": {"topic": "/robot/arm"}})
        );
    }

    #[rstest]
    fn test_serialize_publish() {
        let frame = RachWsFrame::publish("7".to_string(), Ustr::from("/robot/arm"), json!(1));
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            value,
            json!({"type": "pub", "matcher": "7", "data": {"topic": "/robot/arm", "data": 1}})
        );
    }

    #[rstest]
    fn test_serialize_service() {
        let frame = RachWsFrame::service(
            "3".to_string(),
            Ustr::from("/calc/add"),
            json!({"lhs": 1, "rhs": 2}),
        );
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "service",
                "matcher": "3",
                "data": {"topic": "/calc/add", "args": {"lhs": 1, "rhs": 2}},
            })
        );
    }

    #[rstest]
    fn test_serialize_ping_has_null_data() {
        let frame = RachWsFrame::ping("2".to_string());
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value, json!({"type": "cs_ping", "matcher": "2", "data": null}));
    }

    #[rstest]
    fn test_parse_ack() {
        let frame = parse_ws_frame(r#"{"type":"ack","matcher":"3"}"#).unwrap();
        assert_eq!(frame.msg_type.as_deref(), Some("ack"));
        assert_eq!(frame.matcher.as_deref(), Some("3"));
        assert!(frame.data.is_none());
    }

    #[rstest]
    fn test_parse_err_with_verbose() {
        let frame =
            parse_ws_frame(r#"{"type":"err","matcher":"3","verbose":"denied"}"#).unwrap();
        assert_eq!(frame.msg_type.as_deref(), Some("err"));
        assert_eq!(frame.verbose.as_deref(), Some("denied"));
    }

    #[rstest]
    fn test_parse_pub_push_without_matcher() {
        let frame =
            parse_ws_frame(r#"{"type":"pub","data":{"topic":"/robot/arm","value":1}}"#).unwrap();
        assert_eq!(frame.msg_type.as_deref(), Some("pub"));
        assert!(frame.matcher.is_none());
        let data = frame.data.unwrap();
        assert_eq!(data["topic"], "/robot/arm");
    }

    #[rstest]
    fn test_parse_frame_missing_type() {
        let frame = parse_ws_frame(r#"{"matcher":"9"}"#).unwrap();
        assert!(frame.msg_type.is_none());
    }

    #[rstest]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_ws_frame("not json"),
            Err(RachWsError::Json(_))
        ));
    }
}
