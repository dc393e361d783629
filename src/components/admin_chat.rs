//! Live admin-support chat thread.
//!
//! Consumes the session manager: initializes the room once per mount
//! (guarded by the state machine, not an ad hoc flag), renders the thread
//! grouped by day, and drives the scroll/presence heuristics that decide
//! when messages count as read.

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::net::types::MessageType;
use crate::session::ChatSession;
use crate::state::chat::{ChatError, ChatPhase, ChatState, ConnectionStatus, Message};
use crate::util::time::{day_label, group_by_day, time_hhmm, today_and_yesterday_keys};

/// How close to the bottom (px) still counts as "at the conversation".
const AT_BOTTOM_SLACK: i32 = 50;

/// The admin-chat tab: header with connection status and reconnect,
/// date-grouped thread, and the message input.
#[component]
pub fn AdminChatTab() -> impl IntoView {
    let session = expect_context::<ChatSession>();
    let state = session.state();

    let input = RwSignal::new(String::new());
    let is_sending = RwSignal::new(false);
    let at_bottom = RwSignal::new(true);
    let prev_len = RwSignal::new(0_usize);
    let container_ref = NodeRef::<leptos::html::Div>::new();

    // Kick the session exactly once per mount. The phase machine is the
    // re-entry guard: an already-initialized session only reconnects.
    Effect::new(move || {
        let (phase, connection) = state.with_untracked(|s| (s.phase, s.connection));
        match phase {
            ChatPhase::Idle => leptos::task::spawn_local(session.initialize_chat()),
            ChatPhase::Ready if connection == ConnectionStatus::Disconnected => {
                session.connect_web_socket();
            }
            _ => {}
        }
    });

    // No credential is terminal: hand the user to the login page.
    let navigate = leptos_router::hooks::use_navigate();
    Effect::new(move || {
        if state.with(|s| s.error == Some(ChatError::Unauthenticated)) {
            navigate("/login", NavigateOptions::default());
        }
    });

    // Viewer presence: mounted + page visible + scrolled to the bottom.
    // While present, anything unread is marked read.
    Effect::new(move || {
        let present = session.page_visible().get() && at_bottom.get();
        session.set_viewer_present(present);
        if present && state.with(|s| s.unread_count > 0) {
            leptos::task::spawn_local(session.mark_as_read());
        }
    });
    on_cleanup(move || {
        session.set_viewer_present(false);
        session.disconnect();
    });

    // Autoscroll on growth, unless the user scrolled away. A message the
    // user just sent always scrolls.
    Effect::new(move || {
        let len = state.with(|s| s.messages.len());
        if len > prev_len.get_untracked() {
            let sent_last = state.with_untracked(|s| s.messages.last().is_some_and(Message::is_sent));
            if sent_last || at_bottom.get_untracked() {
                scroll_to_bottom(&container_ref);
            }
        }
        prev_len.set(len);
    });

    let on_scroll = move |_| {
        #[cfg(feature = "hydrate")]
        {
            if let Some(el) = container_ref.get_untracked() {
                let gap = el.scroll_height() - el.scroll_top() - el.client_height();
                at_bottom.set(gap < AT_BOTTOM_SLACK);
            }
        }
    };

    let do_send = move || {
        let text = input.get_untracked();
        if text.trim().is_empty() || is_sending.get_untracked() {
            return;
        }
        if state.with_untracked(|s| s.connection != ConnectionStatus::Connected) {
            return;
        }
        is_sending.set(true);
        leptos::task::spawn_local(async move {
            let sent = session.send_message(&text, MessageType::Text).await;
            is_sending.set(false);
            if sent.is_ok() {
                input.set(String::new());
                at_bottom.set(true);
                scroll_to_bottom(&container_ref);
            }
        });
    };

    let on_click = move |_| do_send();
    let on_keydown = move |ev: leptos::ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            do_send();
        }
    };

    // A failed initialization needs a fresh room fetch; a dropped
    // connection only needs the transport back.
    let on_reconnect = move |_| {
        if state.with_untracked(|s| s.phase == ChatPhase::Ready) {
            session.connect_web_socket();
        } else {
            leptos::task::spawn_local(session.initialize_chat());
        }
    };

    let status_class = move || match state.with(|s| s.connection) {
        ConnectionStatus::Connected => "admin-chat__dot admin-chat__dot--connected",
        ConnectionStatus::Connecting => "admin-chat__dot admin-chat__dot--connecting",
        ConnectionStatus::Disconnected => "admin-chat__dot admin-chat__dot--disconnected",
    };
    let status_label = move || match state.with(|s| s.connection) {
        ConnectionStatus::Connected => "Đang online",
        ConnectionStatus::Connecting => "Đang kết nối...",
        ConnectionStatus::Disconnected => "Chưa kết nối",
    };
    let show_reconnect = move || {
        state.with(|s| {
            s.connection == ConnectionStatus::Disconnected
                && !matches!(s.phase, ChatPhase::Idle | ChatPhase::Loading)
        })
    };
    let is_loading = move || state.with(|s| s.phase == ChatPhase::Loading);
    let can_type = move || {
        state.with(|s| s.connection == ConnectionStatus::Connected) && !is_sending.get()
    };
    let placeholder = move || {
        if state.with(|s| s.connection == ConnectionStatus::Connected) {
            "Nhập tin nhắn..."
        } else {
            "Vui lòng kết nối để gửi tin nhắn..."
        }
    };

    view! {
        <div class="admin-chat">
            <div class="admin-chat__header">
                <div class="admin-chat__title">
                    <h2>"Admin Support"</h2>
                    <span class="admin-chat__status">
                        <span class=status_class></span>
                        {status_label}
                    </span>
                </div>
                <Show when=show_reconnect>
                    <button class="btn btn--primary" on:click=on_reconnect>
                        "Kết nối lại"
                    </button>
                </Show>
            </div>

            {move || {
                state
                    .with(|s| s.error.clone())
                    .filter(|e| *e != ChatError::Unauthenticated)
                    .map(|error| {
                        view! {
                            <div class="admin-chat__error">
                                <span>{error.to_string()}</span>
                                <button
                                    class="admin-chat__error-dismiss"
                                    on:click=move |_| session.clear_error()
                                >
                                    "×"
                                </button>
                            </div>
                        }
                    })
            }}

            <div class="admin-chat__messages" node_ref=container_ref on:scroll=on_scroll>
                {move || {
                    if is_loading() {
                        return view! {
                            <div class="admin-chat__loading">"Đang tải dữ liệu..."</div>
                        }
                            .into_any();
                    }
                    let messages = state.with(ChatState::thread_snapshot);
                    if messages.is_empty() {
                        return view! {
                            <div class="admin-chat__empty">
                                <h3>"Chào mừng đến với Admin Chat"</h3>
                                <p>
                                    "Bạn có thể chat trực tiếp với admin tại đây. "
                                    "Gửi tin nhắn để bắt đầu cuộc trò chuyện!"
                                </p>
                            </div>
                        }
                            .into_any();
                    }

                    let (today, yesterday) = today_and_yesterday_keys();
                    group_by_day(&messages)
                        .into_iter()
                        .map(|(key, msgs)| {
                            let label = day_label(&key, &today, &yesterday);
                            let bubbles = msgs
                                .into_iter()
                                .map(|msg| message_view(msg.clone()))
                                .collect::<Vec<_>>();
                            view! {
                                <div class="admin-chat__day">
                                    <div class="admin-chat__day-label">{label}</div>
                                    {bubbles}
                                </div>
                            }
                        })
                        .collect::<Vec<_>>()
                        .into_any()
                }}
            </div>

            <div class="admin-chat__input-row">
                <input
                    class="admin-chat__input"
                    type="text"
                    placeholder=placeholder
                    prop:value=move || input.get()
                    on:input=move |ev| input.set(event_target_value(&ev))
                    on:keydown=on_keydown
                    disabled=move || !can_type()
                />
                <button
                    class="btn btn--primary admin-chat__send"
                    on:click=on_click
                    disabled=move || !can_type() || input.get().trim().is_empty()
                >
                    {move || if is_sending.get() { "Đang gửi..." } else { "Gửi" }}
                </button>
            </div>
        </div>
    }
}

/// Render one thread entry: a centered system pill or a message bubble.
fn message_view(msg: Message) -> impl IntoView {
    match msg {
        Message::System(notice) => view! {
            <div class="admin-chat__system">
                <span class="admin-chat__system-pill">{notice.content}</span>
            </div>
        }
        .into_any(),
        Message::Chat(m) => {
            let sent = m.direction == crate::state::chat::Direction::Sent;
            let time = time_hhmm(&m.created_at);
            let body = match m.message_type {
                MessageType::Image => view! {
                    <img class="admin-chat__image" src=m.content.clone() alt="Ảnh"/>
                }
                .into_any(),
                MessageType::Text => view! {
                    <p class="admin-chat__text">{m.content.clone()}</p>
                }
                .into_any(),
            };
            let ticks = sent.then(|| {
                view! {
                    <span
                        class="admin-chat__ticks"
                        class:admin-chat__ticks--read=m.is_read
                    >
                        "✓✓"
                    </span>
                }
            });
            view! {
                <div class="admin-chat__row" class:admin-chat__row--sent=sent>
                    <div class="admin-chat__bubble" class:admin-chat__bubble--sent=sent>
                        {body}
                        <div class="admin-chat__meta">
                            <span class="admin-chat__time">{time}</span>
                            {ticks}
                        </div>
                    </div>
                </div>
            }
            .into_any()
        }
    }
}

fn scroll_to_bottom(container_ref: &NodeRef<leptos::html::Div>) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(el) = container_ref.get_untracked() {
            let scroll_height = el.scroll_height();
            el.set_scroll_top(scroll_height);
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = container_ref;
    }
}
