//! Floating AI shopping-assistant widget.
//!
//! Self-contained: its transcript is transient (reset when the widget
//! unmounts), its errors never touch the admin-chat session, and it holds
//! no persistent connection. Each user message is routed through the
//! keyword table first; only unmatched messages reach the AI responder.

use leptos::prelude::*;

use crate::net::assistant as assistant_api;
use crate::state::assistant::{
    ADMIN_CHAT_PATH, AssistantState, Author, Category, Origin, RouteDecision, route_message,
};
use crate::state::auth::stored_identity;
use crate::util::time::{now_iso, time_hhmm};

/// Pause before a canned reply, so the bot does not answer instantly.
const CANNED_REPLY_DELAY_MS: u64 = 800;
/// Pause before the admin transfer notice.
const TRANSFER_NOTICE_DELAY_MS: u64 = 500;
/// Pause between the transfer notice and the redirect.
const TRANSFER_REDIRECT_DELAY_MS: u64 = 1_500;

/// Toggle button plus the assistant panel.
#[component]
pub fn ChatWidget() -> impl IntoView {
    let open = RwSignal::new(false);
    let input = RwSignal::new(String::new());
    let state = RwSignal::new(AssistantState::default());
    let transferring = RwSignal::new(false);
    let messages_ref = NodeRef::<leptos::html::Div>::new();

    // Probe the responder once on mount; an offline service disables the
    // input but keeps the panel browsable.
    Effect::new(move || {
        leptos::task::spawn_local(async move {
            let online = assistant_api::health_check().await;
            state.update(|s| s.online = online);
        });
    });

    // Seed the greeting the first time the panel opens.
    Effect::new(move || {
        if open.get() {
            state.update(|s| {
                let _ = s.greet_once(now_iso());
            });
        }
    });

    // Keep the newest turn in view.
    Effect::new(move || {
        let _ = state.with(|s| s.turns.len());

        #[cfg(feature = "hydrate")]
        {
            if let Some(el) = messages_ref.get() {
                let scroll_height = el.scroll_height();
                el.set_scroll_top(scroll_height);
            }
        }
    });

    let do_send = move || {
        let text = input.get_untracked();
        let trimmed = text.trim().to_owned();
        if state.with_untracked(|s| s.loading || !s.online) || transferring.get_untracked() {
            return;
        }
        // Empty input records no turn at all.
        let Some(decision) = route_message(&trimmed) else {
            return;
        };

        state.update(|s| {
            s.error = None;
            s.push_user(trimmed.clone(), now_iso());
        });
        input.set(String::new());

        match decision {
            RouteDecision::Canned(category) => {
                leptos::task::spawn_local(async move {
                    reply_delay(CANNED_REPLY_DELAY_MS).await;
                    state.update(|s| s.push_canned(category, now_iso()));
                });
            }
            RouteDecision::TransferToAdmin => {
                // Irreversible for the rest of the mount.
                transferring.set(true);
                leptos::task::spawn_local(async move {
                    reply_delay(TRANSFER_NOTICE_DELAY_MS).await;
                    state.update(|s| s.push_canned(Category::Admin, now_iso()));
                    reply_delay(TRANSFER_REDIRECT_DELAY_MS).await;
                    redirect_to_admin_chat();
                });
            }
            RouteDecision::DelegateToAi => {
                state.update(|s| s.loading = true);
                leptos::task::spawn_local(async move {
                    let user_id = stored_identity().map(|i| i.user_id);
                    let conversation_id = state.with_untracked(|s| s.conversation_id.clone());
                    let result = assistant_api::request_reply(
                        &trimmed,
                        user_id.as_deref(),
                        conversation_id.as_deref(),
                    )
                    .await;
                    match result {
                        Ok(resp) => state.update(|s| {
                            s.push_ai(resp.message.content, resp.conversation_id, now_iso());
                            s.loading = false;
                        }),
                        Err(e) => {
                            leptos::logging::warn!("assistant request failed: {e}");
                            state.update(|s| {
                                s.push_offline(now_iso());
                                s.loading = false;
                            });
                        }
                    }
                });
            }
        }
    };

    let on_click = move |_| do_send();
    let on_keydown = move |ev: leptos::ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            do_send();
        }
    };

    let can_send = move || {
        !input.get().trim().is_empty()
            && state.with(|s| !s.loading && s.online)
            && !transferring.get()
    };
    let online_label = move || if state.with(|s| s.online) { "Online" } else { "Offline" };

    view! {
        <button
            class="chat-widget__toggle"
            on:click=move |_| open.update(|o| *o = !*o)
            aria-label="Toggle chat"
        >
            {move || if open.get() { "×" } else { "💬" }}
        </button>

        <Show when=move || open.get()>
            <div class="chat-widget">
                <div class="chat-widget__header">
                    <div>
                        <h3>"AI Shopping Assistant"</h3>
                        <span
                            class="chat-widget__presence"
                            class:chat-widget__presence--offline=move || !state.with(|s| s.online)
                        >
                            {online_label}
                        </span>
                    </div>
                    <button class="chat-widget__close" on:click=move |_| open.set(false)>
                        "×"
                    </button>
                </div>

                {move || {
                    state
                        .with(|s| s.error.clone())
                        .map(|error| {
                            view! {
                                <div class="chat-widget__error">
                                    <span>{error}</span>
                                    <button on:click=move |_| state.update(|s| s.error = None)>
                                        "×"
                                    </button>
                                </div>
                            }
                        })
                }}

                <div class="chat-widget__messages" node_ref=messages_ref>
                    {move || {
                        state
                            .with(|s| s.turns.clone())
                            .into_iter()
                            .map(turn_view)
                            .collect::<Vec<_>>()
                    }}
                    {move || {
                        state.with(|s| s.loading).then(|| {
                            view! {
                                <div class="chat-widget__thinking">"Đang suy nghĩ..."</div>
                            }
                        })
                    }}
                </div>

                <div class="chat-widget__footer">
                    <div class="chat-widget__quick">
                        <button on:click=move |_| input.set("size".to_owned())>"📏 Size"</button>
                        <button on:click=move |_| input.set("đổi trả".to_owned())>
                            "✅ Đổi trả"
                        </button>
                        <button on:click=move |_| input.set("ship".to_owned())>"🚚 Ship"</button>
                    </div>
                    <div class="chat-widget__input-row">
                        <input
                            class="chat-widget__input"
                            type="text"
                            placeholder="Hỏi về sản phẩm, giá cả, size..."
                            prop:value=move || input.get()
                            on:input=move |ev| input.set(event_target_value(&ev))
                            on:keydown=on_keydown
                            disabled=move || {
                                state.with(|s| s.loading || !s.online) || transferring.get()
                            }
                        />
                        <button
                            class="btn btn--primary"
                            on:click=on_click
                            disabled=move || !can_send()
                        >
                            "Gửi"
                        </button>
                    </div>
                    <p class="chat-widget__powered">"✨ Powered by AI"</p>
                </div>
            </div>
        </Show>
    }
}

/// Render a single transcript turn.
fn turn_view(turn: crate::state::assistant::AssistantTurn) -> impl IntoView {
    let time = time_hhmm(&turn.created_at);
    match turn.author {
        Author::User => view! {
            <div class="chat-widget__turn chat-widget__turn--user">
                <div class="chat-widget__bubble chat-widget__bubble--user">
                    <p>{turn.content}</p>
                    <span class="chat-widget__time">{time}</span>
                </div>
            </div>
        }
        .into_any(),
        Author::Bot => {
            let is_ai = turn.origin == Some(Origin::Ai);
            let is_error = turn.origin == Some(Origin::Error);
            let badge = is_ai.then(|| view! { <span class="chat-widget__badge">"✨ AI"</span> });
            view! {
                <div class="chat-widget__turn">
                    <div
                        class="chat-widget__bubble chat-widget__bubble--bot"
                        class:chat-widget__bubble--error=is_error
                    >
                        <p>{turn.content}</p>
                        <div class="chat-widget__meta">
                            <span class="chat-widget__time">{time}</span>
                            {badge}
                        </div>
                    </div>
                </div>
            }
            .into_any()
        }
    }
}

/// Conversational pacing only; carries no correctness meaning.
async fn reply_delay(ms: u64) {
    #[cfg(feature = "hydrate")]
    {
        gloo_timers::future::sleep(std::time::Duration::from_millis(ms)).await;
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = ms;
    }
}

/// Hard navigation to the admin-chat screen; the widget does not live
/// past it.
fn redirect_to_admin_chat() {
    #[cfg(feature = "hydrate")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href(ADMIN_CHAT_PATH);
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = ADMIN_CHAT_PATH;
    }
}
