//! Session state for the admin-support chat.
//!
//! `ChatState` is the single owner of the room, the message list, the
//! connection status, and the unread counter. Every mutation goes through
//! a transition method here so the async glue in `crate::session` and the
//! socket dispatch in `crate::net::socket` stay thin and the behavior is
//! testable without a browser.
//!
//! INVARIANTS
//! ==========
//! - Message ids are unique within `messages`; an incoming message whose
//!   id is already present is dropped. This is the only ordering safety
//!   net between the optimistic REST append and push delivery.
//! - Push events only apply while `subscribed` holds; after teardown or a
//!   connection drop they are silently ignored.
//! - `generation` increases on teardown; async continuations compare it
//!   to drop results that finished after the session they belong to.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use crate::net::types::{ChatRoom, MessageDto, MessageType};

/// Lifecycle phase of the chat session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChatPhase {
    /// Nothing started yet.
    #[default]
    Idle,
    /// Room + history fetch in flight.
    Loading,
    /// Room and history are loaded; the push channel may or may not be up.
    Ready,
    /// Initialization failed; a retry re-enters `Loading`.
    Failed,
}

/// Push-channel connection status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Whether a chat message was authored by the current user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

/// A message from the backend, tagged at ingestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub content: String,
    pub message_type: MessageType,
    pub created_at: String,
    pub is_read: bool,
    pub direction: Direction,
}

impl ChatMessage {
    /// Build from a wire DTO, computing the direction once.
    #[must_use]
    pub fn from_dto(dto: MessageDto, my_id: &str) -> Self {
        let direction = if dto.sender_id == my_id {
            Direction::Sent
        } else {
            Direction::Received
        };
        Self {
            id: dto.id,
            sender_id: dto.sender_id,
            content: dto.content,
            message_type: dto.message_type,
            created_at: dto.created_at,
            is_read: dto.is_read,
            direction,
        }
    }
}

/// A locally injected notice ("mất kết nối", transfer copy). Never sent
/// to the backend; the id is a locally synthesized sentinel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemNotice {
    pub id: String,
    pub content: String,
    pub created_at: String,
}

/// One entry in the thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Chat(ChatMessage),
    System(SystemNotice),
}

impl Message {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Chat(m) => &m.id,
            Self::System(n) => &n.id,
        }
    }

    #[must_use]
    pub fn created_at(&self) -> &str {
        match self {
            Self::Chat(m) => &m.created_at,
            Self::System(n) => &n.created_at,
        }
    }

    /// True for a chat message the current user authored.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Chat(m) if m.direction == Direction::Sent)
    }
}

/// Errors surfaced to the chat views.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// No stored identity; the caller must redirect to login, not retry.
    #[error("Vui lòng đăng nhập để sử dụng chat")]
    Unauthenticated,
    /// Room or history fetch failed; retryable by re-initializing.
    #[error("Không thể tải phòng chat")]
    RoomUnavailable,
    /// Push-channel handshake failed; retryable via the reconnect action.
    #[error("Không thể kết nối máy chủ chat")]
    ConnectionFailed,
    /// `send_message` called before a room exists.
    #[error("Phòng chat chưa được khởi tạo")]
    RoomNotInitialized,
    /// The backend rejected a send; local state is untouched.
    #[error("{0}")]
    SendFailed(String),
}

/// The session manager's state. Owned by a single `RwSignal` provided
/// through [`crate::session::ChatSession`]; views read, never mutate.
#[derive(Clone, Debug, Default)]
pub struct ChatState {
    pub phase: ChatPhase,
    pub connection: ConnectionStatus,
    pub room: Option<ChatRoom>,
    pub messages: Vec<Message>,
    pub unread_count: u32,
    pub error: Option<ChatError>,
    /// Subscription guard: true while the room topics are registered on
    /// the transport. Cleared on teardown and on every connection loss so
    /// the subscription effect re-arms exactly once per connection.
    pub subscribed: bool,
    /// Bumped on teardown; stale async continuations check it.
    pub generation: u64,
}

impl ChatState {
    /// Start initialization. Returns `false` when nothing should be
    /// fetched: no identity (records [`ChatError::Unauthenticated`]), or
    /// initialization already started.
    pub fn begin_initialize(&mut self, has_identity: bool) -> bool {
        if !has_identity {
            self.fail_unauthenticated();
            return false;
        }
        if matches!(self.phase, ChatPhase::Loading | ChatPhase::Ready) {
            return false;
        }
        self.phase = ChatPhase::Loading;
        self.error = None;
        true
    }

    /// Install the fetched room and history and compute the initial
    /// unread count (counterpart messages not yet marked read).
    pub fn finish_initialize(&mut self, room: ChatRoom, history: Vec<MessageDto>, my_id: &str) {
        self.messages = history
            .into_iter()
            .map(|dto| Message::Chat(ChatMessage::from_dto(dto, my_id)))
            .collect();
        self.unread_count = self.count_unread_received();
        self.room = Some(room);
        self.phase = ChatPhase::Ready;
        self.error = None;
    }

    /// Record a failed room/history fetch. Retryable.
    pub fn fail_initialize(&mut self) {
        self.phase = ChatPhase::Failed;
        self.error = Some(ChatError::RoomUnavailable);
    }

    /// The credential itself is gone (missing, or a 401 mid-flight).
    /// Terminal: the caller must re-authenticate, not retry.
    pub fn fail_unauthenticated(&mut self) {
        self.phase = ChatPhase::Failed;
        self.error = Some(ChatError::Unauthenticated);
    }

    /// Surface an error without touching phase or connection.
    pub fn note_error(&mut self, error: ChatError) {
        self.error = Some(error);
    }

    /// Dismiss the surfaced error banner.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Start a connection attempt. Returns `false` while an attempt is
    /// already in flight or the channel is up, so concurrent callers
    /// cannot open a second transport.
    pub fn begin_connect(&mut self) -> bool {
        if self.connection != ConnectionStatus::Disconnected {
            return false;
        }
        self.connection = ConnectionStatus::Connecting;
        true
    }

    /// Resolve a connection attempt.
    pub fn finish_connect(&mut self, ok: bool) {
        if ok {
            self.connection = ConnectionStatus::Connected;
            if self.error == Some(ChatError::ConnectionFailed) {
                self.error = None;
            }
        } else {
            self.connection = ConnectionStatus::Disconnected;
            self.error = Some(ChatError::ConnectionFailed);
        }
    }

    /// The transport dropped; subscriptions died with it.
    pub fn connection_lost(&mut self) {
        self.connection = ConnectionStatus::Disconnected;
        self.subscribed = false;
    }

    /// Apply a push-delivered message. Returns `true` when the message
    /// was appended, `false` when it was dropped as a duplicate or the
    /// session is not subscribed (torn down, or a stale delivery).
    ///
    /// Counterpart messages increment the unread counter unless the
    /// viewer is present at the conversation.
    pub fn apply_incoming(&mut self, dto: MessageDto, my_id: &str, viewer_present: bool) -> bool {
        if !self.subscribed {
            return false;
        }
        if self.contains_id(&dto.id) {
            return false;
        }
        let msg = ChatMessage::from_dto(dto, my_id);
        let from_counterpart = msg.direction == Direction::Received;
        self.messages.push(Message::Chat(msg));
        if from_counterpart && !viewer_present {
            self.unread_count += 1;
        }
        true
    }

    /// Optimistically append the REST response of a send. The id check
    /// guards against the push channel having delivered the same message
    /// first.
    pub fn record_sent(&mut self, dto: MessageDto, my_id: &str) -> bool {
        if self.contains_id(&dto.id) {
            return false;
        }
        self.messages
            .push(Message::Chat(ChatMessage::from_dto(dto, my_id)));
        true
    }

    /// The counterpart read the room: flip delivery ticks on everything
    /// the current user sent. Ignored when not subscribed.
    pub fn apply_read_receipt(&mut self) {
        if !self.subscribed {
            return;
        }
        for msg in &mut self.messages {
            if let Message::Chat(m) = msg {
                if m.direction == Direction::Sent {
                    m.is_read = true;
                }
            }
        }
    }

    /// Whether a mark-as-read call would change anything. Consulted
    /// before hitting the backend so repeated view triggers (scroll,
    /// visibility) persist at most once per batch of unread messages.
    #[must_use]
    pub fn should_mark_read(&self) -> bool {
        self.room.is_some() && (self.unread_count > 0 || self.count_unread_received() > 0)
    }

    /// Local half of mark-as-read: zero the counter and mark received
    /// messages read.
    pub fn clear_unread(&mut self) {
        self.unread_count = 0;
        for msg in &mut self.messages {
            if let Message::Chat(m) = msg {
                if m.direction == Direction::Received {
                    m.is_read = true;
                }
            }
        }
    }

    /// Inject a local system notice into the thread.
    pub fn add_system_message(&mut self, content: &str, created_at: String) {
        self.messages.push(Message::System(SystemNotice {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.to_owned(),
            created_at,
        }));
    }

    /// Teardown on unmount/logout: invalidate in-flight continuations and
    /// drop the subscription guard. Room and messages are left for the
    /// caller to discard.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.connection = ConnectionStatus::Disconnected;
        self.subscribed = false;
    }

    /// Whether a continuation started under `generation` is still current.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Clone of the thread for rendering.
    #[must_use]
    pub fn thread_snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    fn contains_id(&self, id: &str) -> bool {
        self.messages.iter().any(|m| m.id() == id)
    }

    fn count_unread_received(&self) -> u32 {
        let count = self
            .messages
            .iter()
            .filter(|m| match m {
                Message::Chat(c) => c.direction == Direction::Received && !c.is_read,
                Message::System(_) => false,
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}
