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

//! WebSocket feed handler for the Rach client.
//!
//! The handler runs in a dedicated Tokio task as the single writer of the
//! correlation table, the subscriber callback map, and the topic registries.
//! It owns the socket, drives the supervising reconnect loop, and processes
//! commands from the client via an unbounded channel. Inbound frames are
//! dispatched strictly in arrival order.

use std::{
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU8, Ordering},
    },
    time::Duration,
};

use ahash::AHashMap;
use dashmap::DashMap;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use ustr::Ustr;

use super::{
    ErrorCallback, PingCallback, ServiceResultCallback, TopicCallback,
    enums::{ConnectionMode, RachMessageType, TopicState},
    error::{RachWsError, RachWsResult},
    messages::{RachWsFrame, parse_ws_frame},
};
use crate::common::parse::is_truthy;

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Commands sent from the client to the handler.
#[allow(missing_debug_implementations)]
pub enum HandlerCommand {
    /// Subscribe to a fully-qualified topic.
    Subscribe {
        /// Resolved topic name.
        topic: Ustr,
        /// Callback invoked with each pushed data object.
        callback: TopicCallback,
    },
    /// Remove an active subscription.
    Unsubscribe {
        /// Resolved topic name.
        topic: Ustr,
    },
    /// Register intent to publish to a topic.
    RegisterPublisher {
        /// Resolved topic name.
        topic: Ustr,
    },
    /// Remove a publisher registration.
    UnregisterPublisher {
        /// Resolved topic name.
        topic: Ustr,
    },
    /// Publish data to a registered topic (fire-and-forget).
    Publish {
        /// Resolved topic name.
        topic: Ustr,
        /// Payload to publish.
        data: Value,
    },
    /// Issue a request/response service call.
    ServiceCall {
        /// Resolved service topic.
        topic: Ustr,
        /// Arguments forwarded to the service.
        args: Value,
        /// Invoked with the optional result payload.
        on_result: ServiceResultCallback,
        /// Invoked on any failure.
        on_error: ErrorCallback,
    },
    /// Issue a liveness ping.
    Ping {
        /// Invoked when the round trip completes.
        on_pong: PingCallback,
        /// Invoked on any failure.
        on_error: ErrorCallback,
    },
    /// Remove every active subscription.
    UnsubscribeAll,
    /// Remove every publisher registration.
    UnregisterAllPublishers,
    /// Run the stop sequence and exit the supervising loop.
    Stop,
}

/// A request awaiting its correlated reply, keyed by matcher.
///
/// Exactly one completion path runs, exactly once, then the record is
/// dropped. Registry-affecting kinds carry the state needed to confirm or
/// revert their registry entry; user-facing kinds carry the caller closures.
#[allow(missing_debug_implementations)]
enum PendingRequest {
    Subscribe { topic: Ustr, callback: TopicCallback },
    Unsubscribe { topic: Ustr },
    AddPublisher { topic: Ustr },
    RemovePublisher { topic: Ustr },
    Service { on_result: ServiceResultCallback, on_error: ErrorCallback },
    Ping { on_pong: PingCallback, on_error: ErrorCallback },
}

/// How a transport session ended.
enum SessionEnd {
    /// The socket dropped; the supervising loop reconnects.
    Dropped,
    /// Stop was requested; the supervising loop exits.
    Stopped,
}

/// Rach WebSocket feed handler.
///
/// Runs in a dedicated Tokio task, keeping exactly one logical session alive
/// until stopped.
#[allow(missing_debug_implementations)]
pub struct RachFeedHandler {
    url: String,
    signal: Arc<AtomicBool>,
    mode: Arc<AtomicU8>,
    reconnect_delay: Duration,
    cmd_rx: tokio::sync::mpsc::UnboundedReceiver<HandlerCommand>,
    writer: Option<WsWriter>,
    matcher_counter: u64,
    pending: AHashMap<String, PendingRequest>,
    callbacks: AHashMap<Ustr, TopicCallback>,
    subscriptions: Arc<DashMap<Ustr, TopicState>>,
    publishers: Arc<DashMap<Ustr, TopicState>>,
}

impl RachFeedHandler {
    /// Creates a new feed handler.
    #[must_use]
    pub fn new(
        url: String,
        signal: Arc<AtomicBool>,
        mode: Arc<AtomicU8>,
        reconnect_delay: Duration,
        cmd_rx: tokio::sync::mpsc::UnboundedReceiver<HandlerCommand>,
        subscriptions: Arc<DashMap<Ustr, TopicState>>,
        publishers: Arc<DashMap<Ustr, TopicState>>,
    ) -> Self {
        Self {
            url,
            signal,
            mode,
            reconnect_delay,
            cmd_rx,
            writer: None,
            matcher_counter: 0,
            pending: AHashMap::new(),
            callbacks: AHashMap::new(),
            subscriptions,
            publishers,
        }
    }

    /// Runs the supervising loop until stopped.
    ///
    /// Each iteration establishes one transport session and drives it to
    /// completion; a dropped session is retried after a fixed delay, with no
    /// back-off and no retry cap.
    pub async fn run(&mut self) {
        loop {
            if self.signal.load(Ordering::Relaxed) {
                break;
            }
            self.set_mode(ConnectionMode::Connect);
            tracing::debug!("Connecting to {}", self.url);

            match connect_async(self.url.as_str()).await {
                Ok((stream, _response)) => {
                    let (writer, reader) = stream.split();
                    self.writer = Some(writer);
                    self.set_mode(ConnectionMode::Active);
                    tracing::debug!("Session established");
                    self.announce_confirmed().await;

                    match self.run_session(reader).await {
                        SessionEnd::Stopped => break,
                        SessionEnd::Dropped => {
                            self.writer = None;
                            self.fail_all_pending(RachWsError::ConnectionLost);
                        }
                    }
                }
                Err(e) => tracing::warn!("Connection attempt failed: {e}"),
            }

            if self.signal.load(Ordering::Relaxed) {
                break;
            }
            self.set_mode(ConnectionMode::Reconnect);
            tracing::debug!("Reconnecting in {:?}", self.reconnect_delay);
            if self.reconnect_pause().await {
                break;
            }
        }
        self.shutdown().await;
    }

    fn set_mode(&self, mode: ConnectionMode) {
        self.mode.store(mode.as_u8(), Ordering::Relaxed);
    }

    /// Generates a fresh matcher, unique for the lifetime of this handler.
    fn next_matcher(&mut self) -> String {
        self.matcher_counter += 1;
        self.matcher_counter.to_string()
    }

    /// Drives one transport session to completion.
    async fn run_session(&mut self, mut reader: WsReader) -> SessionEnd {
        loop {
            tokio::select! {
                Some(cmd) = self.cmd_rx.recv() => {
                    if self.process_command(cmd).await {
                        return SessionEnd::Stopped;
                    }
                }
                msg = reader.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            tracing::trace!("ws recv: {text}");
                            if self.process_frame(&text) {
                                return SessionEnd::Stopped;
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Some(writer) = self.writer.as_mut() {
                                let _ = writer.send(Message::Pong(data)).await;
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::debug!("Received close frame");
                            return SessionEnd::Dropped;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!("Transport error: {e}");
                            return SessionEnd::Dropped;
                        }
                        None => {
                            tracing::debug!("Transport stream ended");
                            return SessionEnd::Dropped;
                        }
                    }
                }
                _ = tokio::time::sleep(Duration::from_millis(100)) => {
                    if self.signal.load(Ordering::Relaxed) {
                        tracing::debug!("Stop signal received");
                        return SessionEnd::Stopped;
                    }
                }
            }
        }
    }

    /// Waits out the reconnect delay while draining commands so callers get
    /// immediate local failures instead of a wedged queue.
    ///
    /// Returns `true` if stop was requested during the pause.
    async fn reconnect_pause(&mut self) -> bool {
        let deadline = tokio::time::Instant::now() + self.reconnect_delay;
        loop {
            tokio::select! {
                Some(cmd) = self.cmd_rx.recv() => {
                    if self.process_command(cmd).await {
                        return true;
                    }
                }
                () = tokio::time::sleep_until(deadline) => {
                    return self.signal.load(Ordering::Relaxed);
                }
            }
        }
    }

    /// Processes a command from the client.
    ///
    /// Returns `true` when the handler should stop.
    async fn process_command(&mut self, cmd: HandlerCommand) -> bool {
        match cmd {
            HandlerCommand::Subscribe { topic, callback } => {
                if self.subscriptions.contains_key(&topic) {
                    tracing::warn!("Already subscribed to {topic}");
                } else {
                    self.subscriptions.insert(topic, TopicState::PendingAdd);
                    let matcher = self.next_matcher();
                    let frame = RachWsFrame::add_sub(matcher.clone(), topic);
                    self.issue(matcher, frame, PendingRequest::Subscribe { topic, callback })
                        .await;
                }
            }
            HandlerCommand::Unsubscribe { topic } => {
                if self.subscriptions.contains_key(&topic) {
                    self.subscriptions.insert(topic, TopicState::PendingRemove);
                    let matcher = self.next_matcher();
                    let frame = RachWsFrame::rm_sub(matcher.clone(), topic);
                    self.issue(matcher, frame, PendingRequest::Unsubscribe { topic })
                        .await;
                } else {
                    tracing::warn!("Not subscribed to {topic}");
                }
            }
            HandlerCommand::RegisterPublisher { topic } => {
                if self.publishers.contains_key(&topic) {
                    tracing::warn!("Already registered to publish to {topic}");
                } else {
                    self.publishers.insert(topic, TopicState::PendingAdd);
                    let matcher = self.next_matcher();
                    let frame = RachWsFrame::add_pub(matcher.clone(), topic);
                    self.issue(matcher, frame, PendingRequest::AddPublisher { topic })
                        .await;
                }
            }
            HandlerCommand::UnregisterPublisher { topic } => {
                if self.publishers.contains_key(&topic) {
                    self.publishers.insert(topic, TopicState::PendingRemove);
                    let matcher = self.next_matcher();
                    let frame = RachWsFrame::rm_pub(matcher.clone(), topic);
                    self.issue(matcher, frame, PendingRequest::RemovePublisher { topic })
                        .await;
                } else {
                    tracing::warn!("Not publishing to {topic}");
                }
            }
            HandlerCommand::Publish { topic, data } => self.handle_publish(topic, data).await,
            HandlerCommand::ServiceCall {
                topic,
                args,
                on_result,
                on_error,
            } => {
                let matcher = self.next_matcher();
                let frame = RachWsFrame::service(matcher.clone(), topic, args);
                self.issue(matcher, frame, PendingRequest::Service { on_result, on_error })
                    .await;
            }
            HandlerCommand::Ping { on_pong, on_error } => {
                let matcher = self.next_matcher();
                let frame = RachWsFrame::ping(matcher.clone());
                self.issue(matcher, frame, PendingRequest::Ping { on_pong, on_error })
                    .await;
            }
            HandlerCommand::UnsubscribeAll => self.unsubscribe_all().await,
            HandlerCommand::UnregisterAllPublishers => self.unregister_all_publishers().await,
            HandlerCommand::Stop => {
                tracing::debug!("Stop command received");
                self.signal.store(true, Ordering::Relaxed);
                return true;
            }
        }
        false
    }

    /// Registers a pending record and sends the request frame.
    ///
    /// A failed send removes the record and runs its error path immediately,
    /// so at most one resolution ever occurs.
    async fn issue(&mut self, matcher: String, frame: RachWsFrame, kind: PendingRequest) {
        self.pending.insert(matcher.clone(), kind);
        if let Err(e) = self.send_frame(&frame).await
            && let Some(kind) = self.pending.remove(&matcher)
        {
            self.fail(kind, e);
        }
    }

    async fn send_frame(&mut self, frame: &RachWsFrame) -> RachWsResult<()> {
        let payload = serde_json::to_string(frame).map_err(|e| RachWsError::Json(e.to_string()))?;
        let Some(writer) = self.writer.as_mut() else {
            return Err(RachWsError::NotConnected);
        };
        tracing::trace!("ws send: {payload}");
        writer
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| RachWsError::Send(e.to_string()))
    }

    async fn handle_publish(&mut self, topic: Ustr, data: Value) {
        let confirmed = self
            .publishers
            .get(&topic)
            .is_some_and(|state| *state == TopicState::Confirmed);
        if !confirmed {
            tracing::warn!("Not registered to publish to {topic}");
            return;
        }
        let matcher = self.next_matcher();
        let frame = RachWsFrame::publish(matcher, topic, data);
        if let Err(e) = self.send_frame(&frame).await {
            tracing::warn!("Publish to {topic} failed: {e}");
        }
    }

    async fn unsubscribe_all(&mut self) {
        let topics: Vec<Ustr> = self
            .subscriptions
            .iter()
            .filter(|entry| *entry.value() == TopicState::Confirmed)
            .map(|entry| *entry.key())
            .collect();
        for topic in topics {
            self.subscriptions.insert(topic, TopicState::PendingRemove);
            let matcher = self.next_matcher();
            let frame = RachWsFrame::rm_sub(matcher.clone(), topic);
            self.issue(matcher, frame, PendingRequest::Unsubscribe { topic })
                .await;
        }
    }

    async fn unregister_all_publishers(&mut self) {
        let topics: Vec<Ustr> = self
            .publishers
            .iter()
            .filter(|entry| *entry.value() == TopicState::Confirmed)
            .map(|entry| *entry.key())
            .collect();
        for topic in topics {
            self.publishers.insert(topic, TopicState::PendingRemove);
            let matcher = self.next_matcher();
            let frame = RachWsFrame::rm_pub(matcher.clone(), topic);
            self.issue(matcher, frame, PendingRequest::RemovePublisher { topic })
                .await;
        }
    }

    /// Re-announces every confirmed subscription and publisher registration
    /// to a freshly established session, with fresh matchers.
    async fn announce_confirmed(&mut self) {
        let topics: Vec<Ustr> = self
            .subscriptions
            .iter()
            .filter(|entry| *entry.value() == TopicState::Confirmed)
            .map(|entry| *entry.key())
            .collect();
        for topic in topics {
            let Some(callback) = self.callbacks.get(&topic).cloned() else {
                continue;
            };
            tracing::debug!("Re-announcing subscription: {topic}");
            self.subscriptions.insert(topic, TopicState::PendingAdd);
            let matcher = self.next_matcher();
            let frame = RachWsFrame::add_sub(matcher.clone(), topic);
            self.issue(matcher, frame, PendingRequest::Subscribe { topic, callback })
                .await;
        }

        let topics: Vec<Ustr> = self
            .publishers
            .iter()
            .filter(|entry| *entry.value() == TopicState::Confirmed)
            .map(|entry| *entry.key())
            .collect();
        for topic in topics {
            tracing::debug!("Re-announcing publisher: {topic}");
            self.publishers.insert(topic, TopicState::PendingAdd);
            let matcher = self.next_matcher();
            let frame = RachWsFrame::add_pub(matcher.clone(), topic);
            self.issue(matcher, frame, PendingRequest::AddPublisher { topic })
                .await;
        }
    }

    /// Dispatches a decoded inbound frame by its type tag.
    ///
    /// Returns `true` when the frame is fatal to the session (failed auth).
    fn process_frame(&mut self, text: &str) -> bool {
        let frame = match parse_ws_frame(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Failed to parse frame: {e}");
                return false;
            }
        };
        let Some(tag) = frame.msg_type.as_deref() else {
            tracing::warn!("Frame lacks type tag, dropping");
            return false;
        };
        let Ok(msg_type) = RachMessageType::from_str(tag) else {
            tracing::trace!("Ignoring unknown frame type: {tag}");
            return false;
        };

        match msg_type {
            RachMessageType::Auth => {
                let success = frame
                    .data
                    .as_ref()
                    .and_then(|data| data.get("success"))
                    .is_some_and(is_truthy);
                if success {
                    tracing::debug!("Session authenticated");
                } else {
                    tracing::error!("Authentication rejected by broker");
                    self.signal.store(true, Ordering::Relaxed);
                    return true;
                }
            }
            RachMessageType::Err => {
                if let Some(kind) = self.take_pending(frame.matcher.as_deref()) {
                    let verbose = frame.verbose.unwrap_or_default();
                    self.fail(kind, RachWsError::Server(verbose));
                }
            }
            RachMessageType::Ack | RachMessageType::CsPing => {
                if let Some(kind) = self.take_pending(frame.matcher.as_deref()) {
                    self.succeed(kind, None);
                }
            }
            RachMessageType::Service => {
                if let Some(kind) = self.take_pending(frame.matcher.as_deref()) {
                    self.succeed(kind, frame.data);
                }
            }
            RachMessageType::Pub => self.process_pub(frame.data),
            RachMessageType::AddSub
            | RachMessageType::RmSub
            | RachMessageType::AddPub
            | RachMessageType::RmPub => {
                tracing::trace!("Ignoring request-only frame type: {tag}");
            }
        }
        false
    }

    /// Pops the pending record for a matcher; unknown or already-resolved
    /// matchers are a silent no-op.
    fn take_pending(&mut self, matcher: Option<&str>) -> Option<PendingRequest> {
        let matcher = matcher?;
        let kind = self.pending.remove(matcher);
        if kind.is_none() {
            tracing::trace!("No pending request for matcher {matcher}");
        }
        kind
    }

    /// Routes a pushed data object to its subscriber callback.
    fn process_pub(&self, data: Option<Value>) {
        let Some(data) = data else {
            tracing::warn!("Push frame lacks data, dropping");
            return;
        };
        let Some(topic) = data.get("topic").and_then(Value::as_str) else {
            tracing::warn!("Push frame lacks topic, dropping");
            return;
        };
        let topic = Ustr::from(topic);
        match self.callbacks.get(&topic) {
            Some(callback) => callback(data),
            None => tracing::trace!("No subscriber for pushed topic {topic}"),
        }
    }

    /// Runs the success path of a resolved request.
    fn succeed(&mut self, kind: PendingRequest, data: Option<Value>) {
        match kind {
            PendingRequest::Subscribe { topic, callback } => {
                self.callbacks.insert(topic, callback);
                self.subscriptions.insert(topic, TopicState::Confirmed);
                tracing::debug!("Subscription confirmed: {topic}");
            }
            PendingRequest::Unsubscribe { topic } => {
                self.callbacks.remove(&topic);
                self.subscriptions.remove(&topic);
                tracing::debug!("Subscription removed: {topic}");
            }
            PendingRequest::AddPublisher { topic } => {
                self.publishers.insert(topic, TopicState::Confirmed);
                tracing::debug!("Publisher confirmed: {topic}");
            }
            PendingRequest::RemovePublisher { topic } => {
                self.publishers.remove(&topic);
                tracing::debug!("Publisher removed: {topic}");
            }
            PendingRequest::Service { on_result, .. } => on_result(data),
            PendingRequest::Ping { on_pong, .. } => on_pong(),
        }
    }

    /// Runs the error path of a resolved request, reverting any in-flight
    /// registry transition.
    fn fail(&mut self, kind: PendingRequest, error: RachWsError) {
        match kind {
            PendingRequest::Subscribe { topic, .. } => {
                tracing::warn!("Subscribe to {topic} failed: {error}");
                self.callbacks.remove(&topic);
                self.subscriptions.remove(&topic);
            }
            PendingRequest::Unsubscribe { topic } => {
                tracing::warn!("Unsubscribe from {topic} failed: {error}");
                // Revert only acknowledged subscriptions. When the removal
                // raced an un-acked addSub and both were denied, the addSub
                // error already dropped the entry and never installed the
                // callback; re-inserting here would leave a ghost entry.
                if self.callbacks.contains_key(&topic) {
                    self.subscriptions.insert(topic, TopicState::Confirmed);
                } else {
                    self.subscriptions.remove(&topic);
                }
            }
            PendingRequest::AddPublisher { topic } => {
                tracing::warn!("Publisher registration for {topic} failed: {error}");
                self.publishers.remove(&topic);
            }
            PendingRequest::RemovePublisher { topic } => {
                tracing::warn!("Publisher removal for {topic} failed: {error}");
                // Same race as above: a denied addPub already dropped the
                // entry, so there is nothing to revert to.
                if self.publishers.contains_key(&topic) {
                    self.publishers.insert(topic, TopicState::Confirmed);
                }
            }
            PendingRequest::Service { on_error, .. } => on_error(error),
            PendingRequest::Ping { on_error, .. } => on_error(error),
        }
    }

    /// Fails every outstanding pending request with the given error.
    fn fail_all_pending(&mut self, error: RachWsError) {
        if self.pending.is_empty() {
            return;
        }
        tracing::debug!("Failing {} outstanding requests", self.pending.len());
        let pending = std::mem::take(&mut self.pending);
        for (_, kind) in pending {
            self.fail(kind, error.clone());
        }
    }

    /// Stop sequence: best-effort removal frames for every tracked topic,
    /// then local teardown and the terminal mode transition.
    async fn shutdown(&mut self) {
        tracing::debug!("Shutting down");

        let topics: Vec<Ustr> = self.subscriptions.iter().map(|entry| *entry.key()).collect();
        for topic in topics {
            let matcher = self.next_matcher();
            let _ = self.send_frame(&RachWsFrame::rm_sub(matcher, topic)).await;
        }
        let topics: Vec<Ustr> = self.publishers.iter().map(|entry| *entry.key()).collect();
        for topic in topics {
            let matcher = self.next_matcher();
            let _ = self.send_frame(&RachWsFrame::rm_pub(matcher, topic)).await;
        }

        self.fail_all_pending(RachWsError::ConnectionLost);
        self.subscriptions.clear();
        self.publishers.clear();
        self.callbacks.clear();

        if let Some(mut writer) = self.writer.take() {
            let _ = writer.close().await;
        }
        self.set_mode(ConnectionMode::Closed);
        tracing::debug!("Handler stopped");
    }
}
