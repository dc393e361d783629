//! Storefront home shell.
//!
//! Product browsing, cart, and checkout are separate surfaces outside the
//! chat core; the home page exists so the app has a root to mount the
//! assistant widget on and a path back from the chat screens.

use leptos::prelude::*;

/// Home page — a minimal storefront landing with an entry point to the
/// admin chat. The assistant widget floats over every page from `App`.
#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home-page">
            <header class="home-page__hero">
                <h1>"Shopfront"</h1>
                <p>"Thời trang cho mọi người"</p>
            </header>
            <section class="home-page__support">
                <h2>"Hỗ trợ"</h2>
                <p>
                    "Cần tư vấn? Trợ lý AI ở góc màn hình trả lời ngay, "
                    "hoặc chat trực tiếp với admin."
                </p>
                <a href="/profile/admin-chat" class="btn btn--primary">
                    "Chat với Admin"
                </a>
            </section>
        </div>
    }
}
