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

//! Client handle for the Rach WebSocket broker.
//!
//! [`RachWebSocketClient`] is a cheap-to-clone handle: all clones share the
//! same handler task, topic registries, and command channel. Registration and
//! request operations are non-blocking; they enqueue a command for the handler
//! and return immediately, with results delivered through callbacks and the
//! shared registries.

use std::{
    fmt::Debug,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicBool, AtomicU8, Ordering},
    },
    time::Duration,
};

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use ustr::Ustr;

use super::{
    enums::{ConnectionMode, TopicState},
    error::{RachWsError, RachWsResult},
    handler::{HandlerCommand, RachFeedHandler},
    publisher::RachPublisher,
};
use crate::common::{
    consts::{DEFAULT_NAMESPACE, DEFAULT_RECONNECT_DELAY},
    credential::Credential,
    parse::{normalize_topic, resolve_topic},
    urls::prepare_connection_url,
};

/// WebSocket client for the Rach pub/sub and RPC protocol.
#[derive(Clone)]
pub struct RachWebSocketClient {
    url: String,
    credential: Option<Credential>,
    reconnect_delay: Duration,
    namespace: Arc<RwLock<String>>,
    signal: Arc<AtomicBool>,
    connection_mode: Arc<AtomicU8>,
    cmd_tx: Arc<RwLock<UnboundedSender<HandlerCommand>>>,
    task_handle: Option<Arc<tokio::task::JoinHandle<()>>>,
    subscriptions: Arc<DashMap<Ustr, TopicState>>,
    publishers: Arc<DashMap<Ustr, TopicState>>,
}

impl Debug for RachWebSocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(RachWebSocketClient))
            .field("url", &self.url)
            .field("credential", &self.credential)
            .field("namespace", &self.namespace())
            .field("connection_mode", &self.connection_mode())
            .finish_non_exhaustive()
    }
}

impl RachWebSocketClient {
    /// Creates a new [`RachWebSocketClient`] instance.
    ///
    /// The client starts in the `Closed` mode; nothing happens on the wire
    /// until [`connect`](Self::connect) is called.
    #[must_use]
    pub fn new(
        url: String,
        credential: Option<Credential>,
        reconnect_delay_secs: Option<f64>,
    ) -> Self {
        let reconnect_delay = reconnect_delay_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(DEFAULT_RECONNECT_DELAY);
        // Receiver dropped immediately: commands sent before connect() fail locally
        let (cmd_tx, _) = tokio::sync::mpsc::unbounded_channel();
        Self {
            url,
            credential,
            reconnect_delay,
            namespace: Arc::new(RwLock::new(DEFAULT_NAMESPACE.to_string())),
            signal: Arc::new(AtomicBool::new(false)),
            connection_mode: Arc::new(AtomicU8::new(ConnectionMode::Closed.as_u8())),
            cmd_tx: Arc::new(RwLock::new(cmd_tx)),
            task_handle: None,
            subscriptions: Arc::new(DashMap::new()),
            publishers: Arc::new(DashMap::new()),
        }
    }

    /// Returns the configured broker URL (without the credential query).
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the current topic namespace.
    #[must_use]
    pub fn namespace(&self) -> String {
        self.namespace
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sets the topic namespace, normalized to leading-slash form.
    ///
    /// Affects only operations issued after the call; existing registrations
    /// keep their resolved names.
    pub fn set_namespace(&self, namespace: &str) {
        let normalized = normalize_topic(namespace);
        tracing::debug!("Namespace set to {normalized}");
        *self
            .namespace
            .write()
            .unwrap_or_else(PoisonError::into_inner) = normalized;
    }

    /// Resolves a topic name against the current namespace.
    ///
    /// Topics with a leading `/` are absolute and bypass the namespace.
    #[must_use]
    pub fn fully_qualified_topic(&self, topic: &str) -> String {
        resolve_topic(&self.namespace(), topic)
    }

    /// Returns the current connection mode.
    #[must_use]
    pub fn connection_mode(&self) -> ConnectionMode {
        ConnectionMode::from_u8(self.connection_mode.load(Ordering::Relaxed))
    }

    /// Returns whether a session is established and frames flow.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.connection_mode() == ConnectionMode::Active
    }

    /// Returns whether the client has reached the terminal `Closed` mode.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.connection_mode() == ConnectionMode::Closed
    }

    /// Returns whether the given topic has a broker-confirmed subscription.
    #[must_use]
    pub fn is_subscribed(&self, topic: &str) -> bool {
        let topic = Ustr::from(&self.fully_qualified_topic(topic));
        self.subscriptions
            .get(&topic)
            .is_some_and(|state| *state == TopicState::Confirmed)
    }

    /// Returns whether the given topic has a broker-confirmed publisher
    /// registration.
    #[must_use]
    pub fn is_publisher(&self, topic: &str) -> bool {
        let topic = Ustr::from(&self.fully_qualified_topic(topic));
        self.publishers
            .get(&topic)
            .is_some_and(|state| *state == TopicState::Confirmed)
    }

    /// Returns all broker-confirmed subscription topics.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<Ustr> {
        self.subscriptions
            .iter()
            .filter(|entry| *entry.value() == TopicState::Confirmed)
            .map(|entry| *entry.key())
            .collect()
    }

    /// Returns all broker-confirmed publisher topics.
    #[must_use]
    pub fn publishers(&self) -> Vec<Ustr> {
        self.publishers
            .iter()
            .filter(|entry| *entry.value() == TopicState::Confirmed)
            .map(|entry| *entry.key())
            .collect()
    }

    /// Starts the feed handler task and returns immediately.
    ///
    /// The handler connects, authenticates, and keeps exactly one logical
    /// session alive until [`close`](Self::close). Use
    /// [`wait_until_active`](Self::wait_until_active) to block until the
    /// first session is up. Calling again while a handler task is running
    /// is a warning no-op.
    pub async fn connect(&mut self) {
        if !self.is_closed() {
            tracing::warn!("Already connected");
            return;
        }
        self.signal.store(false, Ordering::Relaxed);
        self.connection_mode
            .store(ConnectionMode::Connect.as_u8(), Ordering::Relaxed);

        let (cmd_tx, cmd_rx) = tokio::sync::mpsc::unbounded_channel();
        *self
            .cmd_tx
            .write()
            .unwrap_or_else(PoisonError::into_inner) = cmd_tx;

        let mut handler = RachFeedHandler::new(
            prepare_connection_url(&self.url, self.credential.as_ref()),
            self.signal.clone(),
            self.connection_mode.clone(),
            self.reconnect_delay,
            cmd_rx,
            self.subscriptions.clone(),
            self.publishers.clone(),
        );
        let handle = tokio::task::spawn(async move { handler.run().await });
        self.task_handle = Some(Arc::new(handle));
        tracing::debug!("Started feed handler task");
    }

    /// Waits until the connection mode is `Active`.
    ///
    /// # Errors
    ///
    /// Returns an error if the deadline passes first, or if the client
    /// reaches the terminal `Closed` mode while waiting (e.g. the broker
    /// rejected authentication).
    pub async fn wait_until_active(&self, timeout_secs: f64) -> RachWsResult<()> {
        let timeout = Duration::try_from_secs_f64(timeout_secs).unwrap_or(Duration::ZERO);
        let deadline = tokio::time::Instant::now() + timeout;
        while !self.is_active() {
            if self.is_closed() {
                return Err(RachWsError::ConnectionLost);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(RachWsError::Timeout(format!(
                    "Client connection timeout after {timeout_secs}s"
                )));
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(())
    }

    /// Stops the client: announces removal of all registrations to the
    /// broker (best effort), fails outstanding requests, and stops the
    /// handler task. Terminal; the client never reconnects afterwards.
    pub async fn close(&self) {
        tracing::debug!("Closing");
        self.signal.store(true, Ordering::Relaxed);
        let _ = self.send_cmd(HandlerCommand::Stop);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !self.is_closed() {
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!("Timeout waiting for handler task to stop, aborting");
                if let Some(handle) = &self.task_handle {
                    handle.abort();
                }
                self.connection_mode
                    .store(ConnectionMode::Closed.as_u8(), Ordering::Relaxed);
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tracing::debug!("Closed");
    }

    /// Subscribes to a topic, invoking `callback` with each pushed data
    /// object.
    ///
    /// Non-blocking: the subscription is confirmed asynchronously and shows
    /// up via [`is_subscribed`](Self::is_subscribed) once acknowledged.
    /// Subscribing to an already-tracked topic is a warning no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub fn subscribe<F>(&self, topic: &str, callback: F) -> RachWsResult<()>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let topic = Ustr::from(&self.fully_qualified_topic(topic));
        if self.subscriptions.contains_key(&topic) {
            tracing::warn!("Already subscribed to {topic}");
            return Ok(());
        }
        self.send_cmd(HandlerCommand::Subscribe {
            topic,
            callback: Arc::new(callback),
        })
    }

    /// Removes a subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub fn unsubscribe(&self, topic: &str) -> RachWsResult<()> {
        let topic = Ustr::from(&self.fully_qualified_topic(topic));
        self.send_cmd(HandlerCommand::Unsubscribe { topic })
    }

    /// Removes every active subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub fn unsubscribe_all(&self) -> RachWsResult<()> {
        self.send_cmd(HandlerCommand::UnsubscribeAll)
    }

    /// Registers intent to publish to a topic and returns a bound
    /// [`RachPublisher`] handle immediately.
    ///
    /// The registration is confirmed asynchronously; publishes through the
    /// handle are dropped with a warning until the broker acknowledges.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub fn register_publisher(&self, topic: &str) -> RachWsResult<RachPublisher> {
        let topic = Ustr::from(&self.fully_qualified_topic(topic));
        if self.publishers.contains_key(&topic) {
            tracing::warn!("Already registered to publish to {topic}");
        } else {
            self.send_cmd(HandlerCommand::RegisterPublisher { topic })?;
        }
        Ok(RachPublisher::new(self.clone(), topic))
    }

    /// Removes a publisher registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub fn unregister_publisher(&self, topic: &str) -> RachWsResult<()> {
        let topic = Ustr::from(&self.fully_qualified_topic(topic));
        self.send_cmd(HandlerCommand::UnregisterPublisher { topic })
    }

    /// Removes every publisher registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub fn unregister_all_publishers(&self) -> RachWsResult<()> {
        self.send_cmd(HandlerCommand::UnregisterAllPublishers)
    }

    /// Publishes data to a topic (fire-and-forget, no acknowledgment).
    ///
    /// Requires a broker-confirmed publisher registration for the topic;
    /// otherwise the publish is dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub fn publish(&self, topic: &str, data: Value) -> RachWsResult<()> {
        let topic = Ustr::from(&self.fully_qualified_topic(topic));
        self.send_cmd(HandlerCommand::Publish { topic, data })
    }

    /// Issues a request/response service call.
    ///
    /// Exactly one of `on_result` or `on_error` is invoked, exactly once:
    /// `on_result` with the optional result payload, or `on_error` with the
    /// broker error, connection loss, or an immediate local failure when the
    /// client is not connected.
    pub fn service_call<R, E>(&self, topic: &str, args: Value, on_result: R, on_error: E)
    where
        R: FnOnce(Option<Value>) + Send + 'static,
        E: FnOnce(RachWsError) + Send + 'static,
    {
        let topic = Ustr::from(&self.fully_qualified_topic(topic));
        let _ = self.send_cmd(HandlerCommand::ServiceCall {
            topic,
            args,
            on_result: Box::new(on_result),
            on_error: Box::new(on_error),
        });
    }

    /// Issues a liveness ping.
    ///
    /// Exactly one of `on_pong` or `on_error` is invoked, exactly once.
    pub fn ping<P, E>(&self, on_pong: P, on_error: E)
    where
        P: FnOnce() + Send + 'static,
        E: FnOnce(RachWsError) + Send + 'static,
    {
        let _ = self.send_cmd(HandlerCommand::Ping {
            on_pong: Box::new(on_pong),
            on_error: Box::new(on_error),
        });
    }

    /// Hands a command to the handler task.
    ///
    /// When the handler is gone the command fails locally: callback-carrying
    /// commands run their error path here so callers always hear back.
    fn send_cmd(&self, cmd: HandlerCommand) -> RachWsResult<()> {
        let sender = self.cmd_tx.read().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = sender.send(cmd) {
            match e.0 {
                HandlerCommand::ServiceCall { on_error, .. } => {
                    on_error(RachWsError::NotConnected);
                }
                HandlerCommand::Ping { on_error, .. } => on_error(RachWsError::NotConnected),
                _ => {}
            }
            return Err(RachWsError::NotConnected);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn test_client() -> RachWebSocketClient {
        RachWebSocketClient::new("ws://localhost:8080/rach".to_string(), None, None)
    }

    #[rstest]
    fn test_new_client_defaults() {
        let client = test_client();
        assert_eq!(client.namespace(), "/");
        assert!(client.is_closed());
        assert!(!client.is_active());
        assert!(client.subscriptions().is_empty());
        assert!(client.publishers().is_empty());
    }

    #[rstest]
    #[case("robot", "/robot")]
    #[case("/robot/", "/robot")]
    #[case("/", "/")]
    fn test_set_namespace_normalizes(#[case] raw: &str, #[case] expected: &str) {
        let client = test_client();
        client.set_namespace(raw);
        assert_eq!(client.namespace(), expected);
    }

    #[rstest]
    fn test_fully_qualified_topic_uses_namespace() {
        let client = test_client();
        client.set_namespace("/robot");
        assert_eq!(client.fully_qualified_topic("arm"), "/robot/arm");
        assert_eq!(client.fully_qualified_topic("/absolute"), "/absolute");
    }

    #[rstest]
    fn test_namespace_shared_across_clones() {
        let client = test_client();
        let clone = client.clone();
        client.set_namespace("/robot");
        assert_eq!(clone.namespace(), "/robot");
    }

    #[rstest]
    fn test_invalid_reconnect_delay_falls_back_to_default() {
        let client =
            RachWebSocketClient::new("ws://localhost:8080/rach".to_string(), None, Some(-1.0));
        assert_eq!(client.reconnect_delay, DEFAULT_RECONNECT_DELAY);
    }

    #[rstest]
    fn test_debug_redacts_password() {
        let credential = Credential::new("robot".to_string(), "hunter2".to_string());
        let client = RachWebSocketClient::new(
            "ws://localhost:8080/rach".to_string(),
            Some(credential),
            None,
        );
        let output = format!("{client:?}");
        assert!(output.contains("ws://localhost:8080/rach"));
        assert!(!output.contains("hunter2"));
    }

    #[rstest]
    fn test_subscribe_before_connect_fails() {
        let client = test_client();
        let result = client.subscribe("arm", |_| {});
        assert!(matches!(result, Err(RachWsError::NotConnected)));
    }

    #[rstest]
    fn test_service_call_before_connect_invokes_on_error() {
        let client = test_client();
        let error = Arc::new(Mutex::new(None));
        let captured = error.clone();
        client.service_call(
            "calc/add",
            json!({"lhs": 1, "rhs": 2}),
            |_| panic!("unexpected result"),
            move |e| *captured.lock().unwrap() = Some(e),
        );
        assert!(matches!(
            error.lock().unwrap().as_ref(),
            Some(RachWsError::NotConnected)
        ));
    }

    #[rstest]
    fn test_ping_before_connect_invokes_on_error() {
        let client = test_client();
        let error = Arc::new(Mutex::new(None));
        let captured = error.clone();
        client.ping(
            || panic!("unexpected pong"),
            move |e| *captured.lock().unwrap() = Some(e),
        );
        assert!(matches!(
            error.lock().unwrap().as_ref(),
            Some(RachWsError::NotConnected)
        ));
    }
}
