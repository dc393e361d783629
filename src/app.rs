//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::chat_widget::ChatWidget;
use crate::pages::{home::HomePage, login::LoginPage, profile::ProfilePage};

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="vi">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Builds the chat session service, provides it through context, and sets
/// up client-side routing. The assistant widget floats over every route.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    // One session per application lifetime; spawns the socket task and
    // provides itself through context for the chat views.
    let _session = crate::session::provide_chat_session();

    view! {
        <Stylesheet id="leptos" href="/pkg/shopfront.css"/>
        <Title text="Shopfront"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("") view=HomePage/>
                <Route path=StaticSegment("profile") view=ProfilePage/>
                <Route
                    path=(StaticSegment("profile"), StaticSegment("admin-chat"))
                    view=ProfilePage
                />
            </Routes>
            <ChatWidget/>
        </Router>
    }
}
