//! REST client for the chat backend.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net` with the stored
//! bearer token attached. Native builds get stubs returning
//! [`ApiError::Unavailable`] so the crate compiles and tests run without a
//! browser.
//!
//! ERROR HANDLING
//! ==============
//! Every operation maps 1:1 to a backend call and classifies failures:
//! 401 means the credential itself is gone (redirect, never retry here),
//! 403/404 are room-scoped, anything else passes the backend message
//! through. Requests run under a generous timeout; the backend performs
//! slow notification side-effects on some writes.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::types::{ChatRoom, MessageDto, SendMessageRequest};

const API_BASE: &str = "/api/chat";

/// REST calls tolerate a slow backend (notification side-effects on some
/// writes), so the timeout is generous.
pub const REQUEST_TIMEOUT_MS: u32 = 30_000;

/// Classified failure of a backend call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// 401: the credential expired; the caller must re-authenticate.
    #[error("Phiên đăng nhập hết hạn. Vui lòng đăng nhập lại.")]
    SessionExpired,
    /// 403: the authenticated user may not touch this room.
    #[error("Bạn không có quyền truy cập phòng chat này.")]
    Forbidden,
    /// 404: the room does not exist (or was closed server-side).
    #[error("Không tìm thấy phòng chat.")]
    RoomNotFound,
    /// Any other non-2xx; carries the backend's own message when present.
    #[error("{0}")]
    Backend(String),
    /// The request never reached the backend.
    #[error("Không thể kết nối máy chủ: {0}")]
    Network(String),
    /// The request timed out client-side.
    #[error("Yêu cầu đã hết thời gian chờ.")]
    Timeout,
    /// Native build: there is no browser to talk through.
    #[error("Chat không khả dụng ngoài trình duyệt")]
    Unavailable,
}

/// Map an HTTP status (plus optional backend message body) to an error.
#[must_use]
pub fn classify_status(status: u16, backend_message: Option<String>) -> ApiError {
    match status {
        401 => ApiError::SessionExpired,
        403 => ApiError::Forbidden,
        404 => ApiError::RoomNotFound,
        _ => match backend_message {
            Some(msg) if !msg.trim().is_empty() => ApiError::Backend(msg),
            _ => ApiError::Backend(format!("Máy chủ trả về lỗi {status}")),
        },
    }
}

/// Fetch (or lazily create) the caller's support room.
///
/// # Errors
///
/// Returns a classified [`ApiError`] on any HTTP or transport failure.
pub async fn fetch_my_room() -> Result<ChatRoom, ApiError> {
    #[cfg(feature = "hydrate")]
    {
        let url = format!("{API_BASE}/my-room");
        get_json(&url).await
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Err(ApiError::Unavailable)
    }
}

/// List a room's messages, oldest first.
///
/// # Errors
///
/// Returns a classified [`ApiError`] on any HTTP or transport failure.
pub async fn fetch_room_messages(
    room_id: &str,
    page: u32,
    size: u32,
) -> Result<Vec<MessageDto>, ApiError> {
    #[cfg(feature = "hydrate")]
    {
        let url = format!("{API_BASE}/rooms/{room_id}/messages?page={page}&size={size}");
        get_json(&url).await
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (room_id, page, size);
        Err(ApiError::Unavailable)
    }
}

/// Send a message; the backend assigns the id and timestamp.
///
/// # Errors
///
/// Returns a classified [`ApiError`] on any HTTP or transport failure.
pub async fn send_message(request: &SendMessageRequest) -> Result<MessageDto, ApiError> {
    #[cfg(feature = "hydrate")]
    {
        let url = format!("{API_BASE}/send");
        post_json(&url, request).await
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = request;
        Err(ApiError::Unavailable)
    }
}

/// Persist read status for a room. Acknowledgement only.
///
/// # Errors
///
/// Returns a classified [`ApiError`] on any HTTP or transport failure.
pub async fn mark_messages_read(room_id: &str) -> Result<(), ApiError> {
    #[cfg(feature = "hydrate")]
    {
        let url = format!("{API_BASE}/rooms/{room_id}/read");
        let resp = with_timeout(REQUEST_TIMEOUT_MS, async {
            authorized(gloo_net::http::Request::post(&url))
                .send()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))
        })
        .await?;
        if resp.ok() {
            Ok(())
        } else {
            Err(classify_response(resp).await)
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = room_id;
        Err(ApiError::Unavailable)
    }
}

/// Race a request future against a client-side timeout.
#[cfg(feature = "hydrate")]
pub(crate) async fn with_timeout<T, F>(ms: u32, fut: F) -> Result<T, ApiError>
where
    F: std::future::Future<Output = Result<T, ApiError>>,
{
    use futures::future::{Either, select};

    let timeout = gloo_timers::future::sleep(std::time::Duration::from_millis(u64::from(ms)));
    match select(Box::pin(fut), Box::pin(timeout)).await {
        Either::Left((out, _)) => out,
        Either::Right(((), _)) => Err(ApiError::Timeout),
    }
}

#[cfg(feature = "hydrate")]
fn authorized(builder: gloo_net::http::RequestBuilder) -> gloo_net::http::RequestBuilder {
    match crate::state::auth::stored_token() {
        Some(token) => builder.header("Authorization", &format!("Bearer {token}")),
        None => builder,
    }
}

#[cfg(feature = "hydrate")]
async fn get_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, ApiError> {
    let resp = with_timeout(REQUEST_TIMEOUT_MS, async {
        authorized(gloo_net::http::Request::get(url))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    })
    .await?;
    parse_response(resp).await
}

#[cfg(feature = "hydrate")]
async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
    url: &str,
    body: &B,
) -> Result<T, ApiError> {
    let resp = with_timeout(REQUEST_TIMEOUT_MS, async {
        authorized(gloo_net::http::Request::post(url))
            .json(body)
            .map_err(|e| ApiError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    })
    .await?;
    parse_response(resp).await
}

#[cfg(feature = "hydrate")]
async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: gloo_net::http::Response,
) -> Result<T, ApiError> {
    if !resp.ok() {
        return Err(classify_response(resp).await);
    }
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))
}

#[cfg(feature = "hydrate")]
async fn classify_response(resp: gloo_net::http::Response) -> ApiError {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    let backend = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message);
    classify_status(resp.status(), backend)
}
