//! Push transport client for the chat backend.
//!
//! One logical WebSocket connection per authenticated session, owned by a
//! long-lived command-driven task. Components never touch the socket;
//! they hold a [`SocketHandle`] and the task reports status and events
//! through [`crate::session::ChatSession`].
//!
//! RECONNECTION
//! ============
//! An unexpected drop of an established connection is retried with a
//! fixed delay up to a bounded attempt budget, reusing the last token.
//! A failed handshake on an explicit connect is NOT retried here — the
//! caller surfaces it and offers a manual reconnect. Subscriptions are
//! per-connection: the registry is cleared on every loss and the session
//! manager re-subscribes once the channel is up again.
//!
//! All WebSocket plumbing is gated behind `#[cfg(feature = "hydrate")]`
//! since it requires a browser environment; the registry, the reconnect
//! policy, and the topic codec are pure and tested natively.

#[cfg(test)]
#[path = "socket_test.rs"]
mod socket_test;

use std::collections::HashSet;

#[cfg(feature = "hydrate")]
use crate::net::types::{ClientFrame, EVENT_CONNECTED, EVENT_MESSAGE, EVENT_READ, MessageDto, PushEnvelope};
#[cfg(feature = "hydrate")]
use crate::session::ChatSession;

/// Delay between automatic reconnect attempts.
pub const RECONNECT_DELAY_MS: u64 = 3_000;
/// Attempt budget before the client parks and waits for a manual reconnect.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;
/// The handshake fails fast so the UI can offer a reconnect quickly.
pub const HANDSHAKE_TIMEOUT_MS: u32 = 5_000;

/// The two per-room channels the backend publishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// New messages: `room/{id}`.
    Messages,
    /// Counterpart read receipts: `room/{id}/read`.
    ReadStatus,
}

impl ChannelKind {
    /// The wire topic for this channel on a given room.
    #[must_use]
    pub fn topic(self, room_id: &str) -> String {
        match self {
            Self::Messages => format!("room/{room_id}"),
            Self::ReadStatus => format!("room/{room_id}/read"),
        }
    }
}

/// Parse a wire topic back into its room and channel kind.
#[must_use]
pub fn parse_topic(topic: &str) -> Option<(String, ChannelKind)> {
    let rest = topic.strip_prefix("room/")?;
    if let Some(room_id) = rest.strip_suffix("/read") {
        if room_id.is_empty() || room_id.contains('/') {
            return None;
        }
        return Some((room_id.to_owned(), ChannelKind::ReadStatus));
    }
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some((rest.to_owned(), ChannelKind::Messages))
}

/// Active subscriptions, at most one per `(room, channel kind)` pair.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionRegistry {
    entries: HashSet<(String, ChannelKind)>,
}

impl SubscriptionRegistry {
    /// Register a subscription. Returns `false` when the pair is already
    /// registered — the caller must not open a second server-side
    /// subscription.
    pub fn subscribe(&mut self, room_id: &str, kind: ChannelKind) -> bool {
        self.entries.insert((room_id.to_owned(), kind))
    }

    /// Remove a subscription. Safe on unknown pairs; returns whether
    /// anything was removed.
    pub fn unsubscribe(&mut self, room_id: &str, kind: ChannelKind) -> bool {
        self.entries.remove(&(room_id.to_owned(), kind))
    }

    /// Whether an inbound event on `topic` should be delivered.
    #[must_use]
    pub fn accepts(&self, topic: &str) -> bool {
        parse_topic(topic).is_some_and(|key| self.entries.contains(&key))
    }

    /// Drop everything. Subscriptions die with their connection.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reconnect attempt budget. Private to the socket task; external code
/// only ever issues `Connect`/`Disconnect` commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReconnectPolicy {
    attempts: u32,
}

impl ReconnectPolicy {
    /// Claim the next attempt. `Some(delay)` to sleep before retrying,
    /// `None` when the budget is exhausted.
    pub fn next_attempt(&mut self) -> Option<u64> {
        if self.attempts >= MAX_RECONNECT_ATTEMPTS {
            return None;
        }
        self.attempts += 1;
        Some(RECONNECT_DELAY_MS)
    }

    /// A successful handshake restores the full budget.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    #[must_use]
    pub fn attempts_used(&self) -> u32 {
        self.attempts
    }
}

/// Commands accepted by the socket task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SocketCommand {
    /// Open the connection (idempotent while up) with a bearer token.
    Connect { token: String },
    /// Register a room channel; requires an established connection.
    Subscribe { room_id: String, kind: ChannelKind },
    /// Drop a room channel. Safe on unknown pairs.
    Unsubscribe { room_id: String, kind: ChannelKind },
    /// Tear the connection down and reset the reconnect budget.
    Disconnect,
}

/// Cloneable handle to the socket task. The default handle (native
/// builds, or before the task is spawned) drops every command.
#[derive(Clone, Default)]
pub struct SocketHandle {
    #[cfg(feature = "hydrate")]
    tx: Option<futures::channel::mpsc::UnboundedSender<SocketCommand>>,
}

impl SocketHandle {
    /// Queue a command for the socket task. Returns `false` when no task
    /// is attached (the command is dropped).
    pub fn send(&self, command: SocketCommand) -> bool {
        #[cfg(feature = "hydrate")]
        {
            self.tx
                .as_ref()
                .is_some_and(|tx| tx.unbounded_send(command).is_ok())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = command;
            false
        }
    }
}

/// Spawn the socket task for this session and return its handle.
#[cfg(feature = "hydrate")]
pub fn spawn_chat_socket(session: ChatSession) -> SocketHandle {
    use futures::channel::mpsc;

    let (tx, rx) = mpsc::unbounded::<SocketCommand>();
    leptos::task::spawn_local(socket_loop(session, rx));
    SocketHandle { tx: Some(tx) }
}

/// Native builds have no socket; commands go nowhere.
#[cfg(not(feature = "hydrate"))]
pub fn spawn_chat_socket(_session: crate::session::ChatSession) -> SocketHandle {
    SocketHandle::default()
}

/// Connection lifecycle: parked until a `Connect` command, then connected
/// until a clean disconnect or reconnect exhaustion.
#[cfg(feature = "hydrate")]
async fn socket_loop(
    session: ChatSession,
    rx: futures::channel::mpsc::UnboundedReceiver<SocketCommand>,
) {
    use futures::StreamExt;
    use std::cell::RefCell;
    use std::rc::Rc;

    let rx = Rc::new(RefCell::new(rx));
    let registry = Rc::new(RefCell::new(SubscriptionRegistry::default()));
    let mut policy = ReconnectPolicy::default();
    let mut token: Option<String> = None;

    'parked: loop {
        let next = { rx.borrow_mut().next().await };
        let Some(cmd) = next else {
            return;
        };
        match cmd {
            SocketCommand::Connect { token: t } => token = Some(t),
            SocketCommand::Subscribe { room_id, .. } => {
                leptos::logging::warn!("subscribe before connect ignored: room {room_id}");
                continue 'parked;
            }
            SocketCommand::Unsubscribe { .. } | SocketCommand::Disconnect => continue 'parked,
        }

        policy.reset();
        let mut reconnecting = false;

        loop {
            let Some(tok) = token.clone() else {
                continue 'parked;
            };
            session.socket_connecting();

            let ws = match open_and_handshake(&tok).await {
                Ok(ws) => ws,
                Err(e) => {
                    leptos::logging::warn!("chat socket handshake failed: {e}");
                    if !reconnecting {
                        session.socket_failed();
                        continue 'parked;
                    }
                    match policy.next_attempt() {
                        Some(delay_ms) => {
                            gloo_timers::future::sleep(std::time::Duration::from_millis(delay_ms))
                                .await;
                            continue;
                        }
                        None => {
                            session.socket_exhausted();
                            continue 'parked;
                        }
                    }
                }
            };

            policy.reset();
            session.socket_connected();

            let end = run_connection(ws, &registry, &rx, session).await;
            registry.borrow_mut().clear();

            match end {
                RunEnd::Clean => {
                    session.socket_closed();
                    continue 'parked;
                }
                RunEnd::Dropped => {
                    session.socket_dropped();
                    match policy.next_attempt() {
                        Some(delay_ms) => {
                            reconnecting = true;
                            gloo_timers::future::sleep(std::time::Duration::from_millis(delay_ms))
                                .await;
                        }
                        None => {
                            session.socket_exhausted();
                            continue 'parked;
                        }
                    }
                }
            }
        }
    }
}

/// How a connection ended.
#[cfg(feature = "hydrate")]
enum RunEnd {
    /// Explicit disconnect (or handle drop): do not reconnect.
    Clean,
    /// Transport failure: eligible for automatic reconnection.
    Dropped,
}

/// Open the WebSocket and complete the auth handshake within the
/// fail-fast timeout.
#[cfg(feature = "hydrate")]
async fn open_and_handshake(
    token: &str,
) -> Result<gloo_net::websocket::futures::WebSocket, String> {
    use futures::future::{Either, select};
    use futures::{SinkExt, StreamExt};
    use gloo_net::websocket::Message;

    let url = chat_ws_url();
    let mut ws =
        gloo_net::websocket::futures::WebSocket::open(&url).map_err(|e| e.to_string())?;

    let auth = serde_json::to_string(&ClientFrame::auth(token)).map_err(|e| e.to_string())?;
    ws.send(Message::Text(auth)).await.map_err(|e| e.to_string())?;

    let mut timeout = std::pin::pin!(gloo_timers::future::sleep(
        std::time::Duration::from_millis(u64::from(HANDSHAKE_TIMEOUT_MS))
    ));

    loop {
        let next = std::pin::pin!(ws.next());
        match select(next, timeout.as_mut()).await {
            Either::Left((Some(Ok(Message::Text(text))), _)) => {
                if let Ok(env) = serde_json::from_str::<PushEnvelope>(&text) {
                    if env.event == EVENT_CONNECTED {
                        break;
                    }
                }
            }
            Either::Left((Some(Ok(Message::Bytes(_))), _)) => {}
            Either::Left((Some(Err(e)), _)) => return Err(e.to_string()),
            Either::Left((None, _)) => return Err("socket closed during handshake".to_owned()),
            Either::Right(((), _)) => return Err("handshake timed out".to_owned()),
        }
    }

    Ok(ws)
}

/// Process commands and inbound events until the connection ends.
#[cfg(feature = "hydrate")]
async fn run_connection(
    ws: gloo_net::websocket::futures::WebSocket,
    registry: &std::rc::Rc<std::cell::RefCell<SubscriptionRegistry>>,
    rx: &std::rc::Rc<
        std::cell::RefCell<futures::channel::mpsc::UnboundedReceiver<SocketCommand>>,
    >,
    session: ChatSession,
) -> RunEnd {
    use futures::future::{Either, select};
    use futures::{SinkExt, StreamExt};
    use gloo_net::websocket::Message;

    let (mut ws_write, mut ws_read) = ws.split();

    let mut rx_borrow = rx.borrow_mut();
    let send_task = async {
        while let Some(cmd) = rx_borrow.next().await {
            match cmd {
                SocketCommand::Connect { .. } => {
                    leptos::logging::log!("chat socket already connected, reusing connection");
                }
                SocketCommand::Subscribe { room_id, kind } => {
                    // The registry borrow must end before the send await.
                    let inserted = registry.borrow_mut().subscribe(&room_id, kind);
                    if inserted {
                        let frame = ClientFrame::subscribe(&kind.topic(&room_id));
                        if send_frame(&mut ws_write, &frame).await.is_err() {
                            return false;
                        }
                    } else {
                        leptos::logging::warn!("duplicate subscription ignored: room {room_id}");
                    }
                }
                SocketCommand::Unsubscribe { room_id, kind } => {
                    let removed = registry.borrow_mut().unsubscribe(&room_id, kind);
                    if removed {
                        let frame = ClientFrame::unsubscribe(&kind.topic(&room_id));
                        if send_frame(&mut ws_write, &frame).await.is_err() {
                            return false;
                        }
                    }
                }
                SocketCommand::Disconnect => {
                    let _ = ws_write.close().await;
                    return true;
                }
            }
        }
        // Every handle is gone; treat as a clean shutdown.
        true
    };

    let recv_task = async {
        while let Some(msg) = ws_read.next().await {
            match msg {
                Ok(Message::Text(text)) => match serde_json::from_str::<PushEnvelope>(&text) {
                    Ok(env) => dispatch_envelope(&env, registry, session),
                    Err(e) => leptos::logging::warn!("unparseable push event: {e}"),
                },
                Ok(Message::Bytes(_)) => {}
                Err(e) => {
                    leptos::logging::warn!("chat socket recv error: {e}");
                    break;
                }
            }
        }
    };

    match select(Box::pin(send_task), Box::pin(recv_task)).await {
        Either::Left((clean, _)) => {
            if clean {
                RunEnd::Clean
            } else {
                RunEnd::Dropped
            }
        }
        Either::Right(((), _)) => RunEnd::Dropped,
    }
}

#[cfg(feature = "hydrate")]
async fn send_frame(
    ws_write: &mut futures::stream::SplitSink<
        gloo_net::websocket::futures::WebSocket,
        gloo_net::websocket::Message,
    >,
    frame: &ClientFrame,
) -> Result<(), ()> {
    use futures::SinkExt;

    let Ok(json) = serde_json::to_string(frame) else {
        return Ok(());
    };
    ws_write
        .send(gloo_net::websocket::Message::Text(json))
        .await
        .map_err(|_| ())
}

/// Route an inbound envelope into session state, gated by the registry.
#[cfg(feature = "hydrate")]
fn dispatch_envelope(
    env: &PushEnvelope,
    registry: &std::rc::Rc<std::cell::RefCell<SubscriptionRegistry>>,
    session: ChatSession,
) {
    match env.event.as_str() {
        EVENT_MESSAGE => {
            let Some(topic) = env.topic.as_deref() else {
                return;
            };
            if !registry.borrow().accepts(topic) {
                return;
            }
            match serde_json::from_value::<MessageDto>(env.data.clone()) {
                Ok(dto) => session.on_incoming_message(dto),
                Err(e) => leptos::logging::warn!("malformed chat message event: {e}"),
            }
        }
        EVENT_READ => {
            let Some(topic) = env.topic.as_deref() else {
                return;
            };
            if registry.borrow().accepts(topic) {
                session.on_read_receipt();
            }
        }
        // The handshake consumed the first one; repeats are harmless.
        EVENT_CONNECTED => {}
        _ => {}
    }
}

/// Derive the WebSocket URL from the current page location.
#[cfg(feature = "hydrate")]
fn chat_ws_url() -> String {
    let location = web_sys::window()
        .and_then(|w| w.location().href().ok())
        .unwrap_or_default();
    let ws_proto = if location.starts_with("https") { "wss" } else { "ws" };
    let host = web_sys::window()
        .and_then(|w| w.location().host().ok())
        .unwrap_or_else(|| "localhost:3000".to_owned());
    format!("{ws_proto}://{host}/ws/chat")
}
