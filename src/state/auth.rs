//! Stored identity and authentication state.
//!
//! The chat core is a read-only consumer of the session the login flow
//! established: a `user` JSON blob and an `accessToken` string in
//! `localStorage`. Token refresh happens elsewhere; an expired credential
//! shows up here as a backend 401, never as a retry.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

/// The credential pair the chat subsystem needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub access_token: String,
}

/// Authentication state shared through context.
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    pub identity: Option<Identity>,
    pub loading: bool,
}

#[cfg(feature = "hydrate")]
#[derive(serde::Deserialize)]
struct StoredUser {
    #[serde(rename = "userId")]
    user_id: String,
}

/// Read the stored identity, if the user is logged in.
///
/// Returns `None` outside the browser and when either half is missing.
#[must_use]
pub fn stored_identity() -> Option<Identity> {
    #[cfg(feature = "hydrate")]
    {
        let storage = web_sys::window()?.local_storage().ok()??;
        let user_json = storage.get_item("user").ok()??;
        let token = storage.get_item("accessToken").ok()??;
        let user: StoredUser = match serde_json::from_str(&user_json) {
            Ok(u) => u,
            Err(e) => {
                leptos::logging::warn!("stored user is not valid JSON: {e}");
                return None;
            }
        };
        Some(Identity {
            user_id: user.user_id,
            access_token: token,
        })
    }
    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}

/// The bearer token alone, for the HTTP client.
#[must_use]
pub fn stored_token() -> Option<String> {
    stored_identity().map(|identity| identity.access_token)
}
