//! Page-visibility tracking.
//!
//! Installs a `visibilitychange` listener for the lifetime of the app and
//! reports the new state through a callback. Returning focus to an open
//! conversation counts as reading it, so the session manager feeds this
//! into its viewer-presence predicate. Requires a browser environment.

/// Watch document visibility. The callback receives `true` when the page
/// becomes visible. The listener lives for the rest of the app; outside
/// the browser this is a no-op.
pub fn watch_visibility(on_change: impl Fn(bool) + 'static) {
    #[cfg(feature = "hydrate")]
    {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::closure::Closure;

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let doc = document.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            on_change(!doc.hidden());
        });
        if document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())
            .is_err()
        {
            leptos::logging::warn!("could not install visibility listener");
        }
        // App-lifetime listener; the closure is never reclaimed.
        closure.forget();
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = on_change;
    }
}

/// Whether the document is currently visible. `true` outside the browser.
#[must_use]
pub fn is_document_visible() -> bool {
    #[cfg(feature = "hydrate")]
    {
        web_sys::window()
            .and_then(|w| w.document())
            .map_or(true, |doc| !doc.hidden())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        true
    }
}
