//! The chat session manager.
//!
//! `ChatSession` is an explicitly constructed service provided through
//! context from the root `App` — one instance per application lifetime,
//! no module-level singletons. It owns the chat state signal, the socket
//! handle, and the viewer-presence signals, and it is the only writer of
//! [`ChatState`]. Views read state and request mutations; they never
//! touch the message list directly.
//!
//! Async orchestration lives here; the state transitions themselves are
//! pure and live in [`crate::state::chat`].

use leptos::prelude::*;

use crate::net::api::{self, ApiError};
use crate::net::socket::{self, ChannelKind, SocketCommand, SocketHandle};
use crate::net::types::{MessageDto, MessageType, SendMessageRequest};
use crate::state::auth::{self, AuthState};
use crate::state::chat::{ChatError, ChatState, ConnectionStatus};

/// Handle to the per-application chat session. Cheap to copy; every copy
/// points at the same signals.
#[derive(Clone, Copy)]
pub struct ChatSession {
    state: RwSignal<ChatState>,
    auth: RwSignal<AuthState>,
    socket: RwSignal<SocketHandle>,
    /// True while the admin-chat thread is mounted, the page is visible,
    /// and the user is scrolled to the bottom — the single predicate the
    /// unread counter is based on.
    viewer_present: RwSignal<bool>,
    /// Document visibility, fed by the app-level listener.
    page_visible: RwSignal<bool>,
}

/// Build the session, spawn its socket task, wire the app-level effects,
/// and provide it through context. Called once from `App`.
pub fn provide_chat_session() -> ChatSession {
    let session = ChatSession {
        state: RwSignal::new(ChatState::default()),
        auth: RwSignal::new(AuthState {
            identity: None,
            loading: true,
        }),
        socket: RwSignal::new(SocketHandle::default()),
        viewer_present: RwSignal::new(false),
        page_visible: RwSignal::new(true),
    };

    let handle = socket::spawn_chat_socket(session);
    session.socket.set(handle);

    // Read the stored identity once the client is up.
    Effect::new(move || {
        session.auth.update(|a| {
            a.identity = auth::stored_identity();
            a.loading = false;
        });
    });

    // Page visibility feeds the viewer-presence predicate.
    crate::util::visibility::watch_visibility(move |visible| {
        session.page_visible.set(visible);
    });

    // Subscribe to the room topics whenever a room and a live connection
    // coexist. The `subscribed` guard re-arms after every reconnect and
    // keeps repeated triggers from opening duplicate subscriptions.
    Effect::new(move || {
        let ready = session.state.with(|s| {
            s.connection == ConnectionStatus::Connected
                && !s.subscribed
                && s.room.is_some()
        });
        if !ready {
            return;
        }
        let Some(room_id) = session.state.with_untracked(|s| s.room.as_ref().map(|r| r.id.clone()))
        else {
            return;
        };
        let handle = session.socket.get_untracked();
        handle.send(SocketCommand::Subscribe {
            room_id: room_id.clone(),
            kind: ChannelKind::Messages,
        });
        handle.send(SocketCommand::Subscribe {
            room_id,
            kind: ChannelKind::ReadStatus,
        });
        session.state.update(|s| s.subscribed = true);
    });

    provide_context(session);
    session
}

impl ChatSession {
    /// The chat state signal. Views read; only the session writes.
    #[must_use]
    pub fn state(&self) -> RwSignal<ChatState> {
        self.state
    }

    #[must_use]
    pub fn auth(&self) -> RwSignal<AuthState> {
        self.auth
    }

    /// Document visibility as a signal, for view-level presence effects.
    #[must_use]
    pub fn page_visible(&self) -> RwSignal<bool> {
        self.page_visible
    }

    /// The admin-chat view reports whether the user is at the thread.
    pub fn set_viewer_present(&self, present: bool) {
        self.viewer_present.set(present);
    }

    /// Fetch-or-create the room and load its history, then bring the push
    /// channel up. No-op while already loading or loaded; records
    /// [`ChatError::Unauthenticated`] and performs no network call when
    /// there is no stored identity.
    pub async fn initialize_chat(self) {
        let identity = self.auth.with_untracked(|a| a.identity.clone());
        let mut proceed = false;
        self.state
            .update(|s| proceed = s.begin_initialize(identity.is_some()));
        let Some(identity) = identity else { return };
        if !proceed {
            return;
        }

        let generation = self.state.with_untracked(|s| s.generation);
        let result = async {
            let room = api::fetch_my_room().await?;
            let history = api::fetch_room_messages(&room.id, 0, 50).await?;
            Ok::<_, ApiError>((room, history))
        }
        .await;

        match result {
            Ok((room, history)) => {
                self.state.update(|s| {
                    if s.is_current(generation) {
                        s.finish_initialize(room, history, &identity.user_id);
                    }
                });
                self.connect_web_socket();
            }
            Err(ApiError::SessionExpired) => {
                self.state.update(|s| {
                    if s.is_current(generation) {
                        s.fail_unauthenticated();
                    }
                });
            }
            Err(e) => {
                leptos::logging::warn!("chat initialization failed: {e}");
                self.state.update(|s| {
                    if s.is_current(generation) {
                        s.fail_initialize();
                    }
                });
            }
        }
    }

    /// Bring the push channel up. No-op while connecting or connected, so
    /// concurrent callers never open a second transport.
    pub fn connect_web_socket(self) {
        let token = self
            .auth
            .with_untracked(|a| a.identity.as_ref().map(|i| i.access_token.clone()));
        let Some(token) = token else {
            self.state
                .update(|s| s.note_error(ChatError::Unauthenticated));
            return;
        };

        let mut proceed = false;
        self.state.update(|s| proceed = s.begin_connect());
        if !proceed {
            return;
        }

        if !self
            .socket
            .get_untracked()
            .send(SocketCommand::Connect { token })
        {
            self.state.update(|s| s.finish_connect(false));
        }
    }

    /// Teardown for unmount/logout: close the transport and invalidate
    /// in-flight continuations. Room and messages stay for the caller to
    /// discard. Safe to call repeatedly and when never connected.
    pub fn disconnect(self) {
        self.socket.get_untracked().send(SocketCommand::Disconnect);
        self.state.update(ChatState::teardown);
    }

    /// Send a message and optimistically append the backend's response.
    ///
    /// Empty (post-trim) content is a silent no-op.
    ///
    /// # Errors
    ///
    /// [`ChatError::RoomNotInitialized`] before a room exists and
    /// [`ChatError::SendFailed`] when the backend rejects the send; local
    /// state is untouched in both cases, so resubmitting is safe.
    pub async fn send_message(
        self,
        content: &str,
        message_type: MessageType,
    ) -> Result<(), ChatError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        let Some(my_id) = self.my_id() else {
            self.state
                .update(|s| s.note_error(ChatError::Unauthenticated));
            return Err(ChatError::Unauthenticated);
        };
        let room_id = self
            .state
            .with_untracked(|s| s.room.as_ref().map(|r| r.id.clone()));
        let Some(room_id) = room_id else {
            self.state
                .update(|s| s.note_error(ChatError::RoomNotInitialized));
            return Err(ChatError::RoomNotInitialized);
        };

        let generation = self.state.with_untracked(|s| s.generation);
        let request = SendMessageRequest {
            room_id,
            content: trimmed.to_owned(),
            message_type,
        };

        match api::send_message(&request).await {
            Ok(dto) => {
                self.state.update(|s| {
                    if s.is_current(generation) {
                        s.record_sent(dto, &my_id);
                    }
                });
                Ok(())
            }
            Err(ApiError::SessionExpired) => {
                self.state.update(|s| {
                    if s.is_current(generation) {
                        s.fail_unauthenticated();
                    }
                });
                Err(ChatError::Unauthenticated)
            }
            Err(e) => {
                let error = ChatError::SendFailed(e.to_string());
                self.state.update(|s| {
                    if s.is_current(generation) {
                        s.note_error(error.clone());
                    }
                });
                Err(error)
            }
        }
    }

    /// Persist read status and zero the unread counter. Best-effort: a
    /// failure is logged and never surfaced. Skips the backend entirely
    /// when there is no room or nothing is unread.
    pub async fn mark_as_read(self) {
        let room_id = self
            .state
            .with_untracked(|s| s.room.as_ref().map(|r| r.id.clone()));
        let Some(room_id) = room_id else { return };
        if !self.state.with_untracked(ChatState::should_mark_read) {
            return;
        }

        let generation = self.state.with_untracked(|s| s.generation);
        match api::mark_messages_read(&room_id).await {
            Ok(()) => self.state.update(|s| {
                if s.is_current(generation) {
                    s.clear_unread();
                }
            }),
            Err(e) => leptos::logging::warn!("mark-as-read failed (ignored): {e}"),
        }
    }

    /// Inject a local notice into the thread ("mất kết nối", ...).
    pub fn add_system_message(self, content: &str) {
        let created_at = crate::util::time::now_iso();
        self.state
            .update(|s| s.add_system_message(content, created_at));
    }

    /// Dismiss the surfaced error banner.
    pub fn clear_error(self) {
        self.state.update(ChatState::clear_error);
    }

    // ---- Socket task callbacks -------------------------------------
    //
    // Called by the transport task to report status and deliver events.

    /// A connection attempt (manual or automatic) started.
    pub fn socket_connecting(self) {
        self.state.update(|s| {
            let _ = s.begin_connect();
        });
    }

    /// The auth handshake completed.
    pub fn socket_connected(self) {
        self.state.update(|s| s.finish_connect(true));
    }

    /// An explicitly requested connect failed its handshake.
    pub fn socket_failed(self) {
        self.state.update(|s| s.finish_connect(false));
    }

    /// The transport dropped unexpectedly; automatic reconnection may
    /// still bring it back.
    pub fn socket_dropped(self) {
        self.state.update(ChatState::connection_lost);
    }

    /// A requested disconnect completed.
    pub fn socket_closed(self) {
        self.state.update(ChatState::connection_lost);
    }

    /// The reconnect budget ran out; only a manual reconnect remains.
    pub fn socket_exhausted(self) {
        self.state.update(|s| s.finish_connect(false));
        self.add_system_message("Mất kết nối với máy chủ. Nhấn \"Kết nối lại\" để tiếp tục.");
    }

    /// A message arrived on a subscribed room topic.
    pub fn on_incoming_message(self, dto: MessageDto) {
        let Some(my_id) = self.my_id() else { return };
        let viewer_present = self.viewer_present.get_untracked();
        self.state.update(|s| {
            let _ = s.apply_incoming(dto, &my_id, viewer_present);
        });
    }

    /// The counterpart read the room.
    pub fn on_read_receipt(self) {
        self.state.update(ChatState::apply_read_receipt);
    }

    fn my_id(&self) -> Option<String> {
        self.auth
            .with_untracked(|a| a.identity.as_ref().map(|i| i.user_id.clone()))
    }
}
