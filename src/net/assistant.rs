//! REST client for the AI shopping-assistant service.
//!
//! A separate deployment from the chat backend, with its own base path
//! and snake_case contract. The widget is the only consumer.

#![allow(clippy::unused_async)]

use super::api::ApiError;
use super::types::{AssistantRequest, AssistantResponse};

const ASSISTANT_BASE: &str = "/assistant";

/// Ask the responder for a reply to an unmatched message.
///
/// `user_id` may be absent (anonymous shoppers are allowed) and
/// `conversation_id` is `None` on the first delegated turn.
///
/// # Errors
///
/// Returns [`ApiError`] when the service is unreachable or rejects the
/// request; the widget turns any failure into its offline fallback.
pub async fn request_reply(
    message: &str,
    user_id: Option<&str>,
    conversation_id: Option<&str>,
) -> Result<AssistantResponse, ApiError> {
    #[cfg(feature = "hydrate")]
    {
        let body = AssistantRequest {
            message: message.trim().to_owned(),
            user_id: user_id.map(ToOwned::to_owned),
            conversation_id: conversation_id.map(ToOwned::to_owned),
        };
        let url = format!("{ASSISTANT_BASE}/chat-bot");
        let resp = super::api::with_timeout(super::api::REQUEST_TIMEOUT_MS, async {
            gloo_net::http::Request::post(&url)
                .json(&body)
                .map_err(|e| ApiError::Network(e.to_string()))?
                .send()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))
        })
        .await?;
        if !resp.ok() {
            return Err(super::api::classify_status(resp.status(), None));
        }
        resp.json::<AssistantResponse>()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (message, user_id, conversation_id);
        Err(ApiError::Unavailable)
    }
}

/// Probe the responder. The widget disables its input when this fails.
pub async fn health_check() -> bool {
    #[cfg(feature = "hydrate")]
    {
        let url = format!("{ASSISTANT_BASE}/health");
        matches!(
            gloo_net::http::Request::get(&url).send().await,
            Ok(resp) if resp.ok()
        )
    }
    #[cfg(not(feature = "hydrate"))]
    {
        false
    }
}
