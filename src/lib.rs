//! # shopfront
//!
//! Leptos + WASM storefront client. The heart of the crate is the
//! real-time chat subsystem: the admin-support chat (REST history plus a
//! reconnecting push channel, orchestrated by a session-manager state
//! machine) and the AI shopping-assistant widget with its keyword-routing
//! fallback.
//!
//! Browser-only code is gated behind the `hydrate` feature; the state
//! machines, the subscription registry, and the routing algorithm are
//! pure and unit-tested natively.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod session;
pub mod state;
pub mod util;

/// WASM entry point: hydrate the server-rendered shell.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(crate::app::App);
}
