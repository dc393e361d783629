//! Login page shell.
//!
//! The real credential flow (forms, token refresh) lives outside the chat
//! core; this page is the navigation target for unauthenticated users.

use leptos::prelude::*;

/// Login page — the chat surfaces redirect here when no identity is
/// stored.
#[component]
pub fn LoginPage() -> impl IntoView {
    view! {
        <div class="login-page">
            <h1>"Shopfront"</h1>
            <p>"Vui lòng đăng nhập để tiếp tục"</p>
            <a href="/" class="login-page__back">
                "Về trang chủ"
            </a>
        </div>
    }
}
