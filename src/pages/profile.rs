//! Profile page shell hosting the admin-chat tab.
//!
//! The other profile tabs (addresses, orders, security) are separate
//! CRUD surfaces outside the chat core; they render as placeholders.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::components::admin_chat::AdminChatTab;
use crate::session::ChatSession;

/// Profile page — sidebar navigation plus the active tab. Redirects to
/// `/login` when no identity is stored.
#[component]
pub fn ProfilePage() -> impl IntoView {
    let session = expect_context::<ChatSession>();
    let location = use_location();

    // Redirect to login if not authenticated.
    let navigate = use_navigate();
    Effect::new(move || {
        let auth = session.auth().get();
        if !auth.loading && auth.identity.is_none() {
            navigate("/login", NavigateOptions::default());
        }
    });

    let pathname = location.pathname;
    let on_admin_chat = move || pathname.get().ends_with("/admin-chat");
    let unread_badge = move || {
        let unread = session.state().with(|s| s.unread_count);
        (unread > 0 && !on_admin_chat()).then(|| {
            view! { <span class="profile-page__badge">{unread}</span> }
        })
    };

    view! {
        <div class="profile-page">
            <aside class="profile-page__sidebar">
                <h2>"Tài khoản"</h2>
                <nav>
                    <a href="/profile" class="profile-page__tab">
                        "Hồ sơ"
                    </a>
                    <a href="/profile/admin-chat" class="profile-page__tab">
                        "Chat với Admin"
                        {unread_badge}
                    </a>
                </nav>
            </aside>
            <main class="profile-page__content">
                {move || {
                    if on_admin_chat() {
                        view! { <AdminChatTab/> }.into_any()
                    } else {
                        view! {
                            <div class="profile-page__placeholder">
                                <h3>"Hồ sơ của bạn"</h3>
                                <p>"Chọn \"Chat với Admin\" để được hỗ trợ trực tiếp."</p>
                            </div>
                        }
                            .into_any()
                    }
                }}
            </main>
        </div>
    }
}
