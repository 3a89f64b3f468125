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

//! Topic name normalization and loose value coercion for the Rach protocol.

use serde_json::Value;

/// Normalizes a topic or namespace string.
///
/// Strips a single trailing `/` (unless the whole string is `/`) and ensures a
/// leading `/`.
#[must_use]
pub fn normalize_topic(raw: &str) -> String {
    let stripped = raw.strip_suffix('/').unwrap_or(raw);
    if stripped.starts_with('/') {
        stripped.to_string()
    } else {
        format!("/{stripped}")
    }
}

/// Resolves a topic name to fully-qualified form.
///
/// Topics starting with `/` are absolute and bypass the namespace; anything
/// else is joined onto the normalized namespace.
#[must_use]
pub fn resolve_topic(namespace: &str, topic: &str) -> String {
    if topic.starts_with('/') {
        return normalize_topic(topic);
    }
    let namespace = normalize_topic(namespace);
    if namespace == "/" {
        normalize_topic(&format!("/{topic}"))
    } else {
        normalize_topic(&format!("{namespace}/{topic}"))
    }
}

/// Returns whether a JSON value is truthy under the protocol's loose rules.
///
/// `false`, `null`, `0`, `""`, and empty collections are falsy; everything
/// else is truthy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("/a/b", "/a/b")]
    #[case("/a/b/", "/a/b")]
    #[case("a/b", "/a/b")]
    #[case("a/b/", "/a/b")]
    #[case("/", "/")]
    #[case("//", "/")]
    #[case("", "/")]
    fn test_normalize_topic(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_topic(raw), expected);
    }

    #[rstest]
    #[case("/", "x", "/x")]
    #[case("/ns", "x", "/ns/x")]
    #[case("/ns/", "x", "/ns/x")]
    #[case("ns", "x", "/ns/x")]
    #[case("/ns", "x/", "/ns/x")]
    #[case("/ns", "a/b", "/ns/a/b")]
    #[case("/ns", "/a/b", "/a/b")]
    #[case("/ns", "/a/b/", "/a/b")]
    #[case("/robot", "arm", "/robot/arm")]
    fn test_resolve_topic(#[case] namespace: &str, #[case] topic: &str, #[case] expected: &str) {
        assert_eq!(resolve_topic(namespace, topic), expected);
    }

    #[rstest]
    #[case(json!(true), true)]
    #[case(json!(false), false)]
    #[case(json!(null), false)]
    #[case(json!(0), false)]
    #[case(json!(1), true)]
    #[case(json!(-1), true)]
    #[case(json!(""), false)]
    #[case(json!("ok"), true)]
    #[case(json!([]), false)]
    #[case(json!([0]), true)]
    #[case(json!({}), false)]
    #[case(json!({"k": 1}), true)]
    fn test_is_truthy(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(is_truthy(&value), expected);
    }
}
