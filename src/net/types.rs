//! Wire types shared by the REST client and the push transport.
//!
//! Payload shapes mirror what the storefront backend returns; field names
//! stay camelCase on the wire (snake_case for the assistant service, which
//! is a separate deployment with its own conventions).

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A 1:1 support conversation between the current user and admin support.
///
/// Created lazily by the backend on first request (get-or-create); the
/// client only ever reads the returned id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    pub id: String,
    /// Owner of the room, when the backend includes it.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Content kind of a chat message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    #[default]
    Text,
    Image,
}

/// A chat message as the backend serializes it, over both REST and push.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub room_id: String,
    pub sender_id: String,
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    pub created_at: String,
    #[serde(default)]
    pub is_read: bool,
}

/// Body for `POST /api/chat/send`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub room_id: String,
    pub content: String,
    pub message_type: MessageType,
}

/// Server-to-client event on the push channel.
///
/// `topic` is present for room-scoped events (`room/{id}` for messages,
/// `room/{id}/read` for read receipts) and absent for session-level events
/// such as `session:connected`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub event: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Event name the server sends once the auth handshake is accepted.
pub const EVENT_CONNECTED: &str = "session:connected";
/// Event name for a new message on a subscribed room topic.
pub const EVENT_MESSAGE: &str = "chat:message";
/// Event name for a counterpart read receipt on a subscribed read topic.
pub const EVENT_READ: &str = "chat:read";

/// Client-to-server frame on the push channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFrame {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl ClientFrame {
    /// Handshake frame carrying the bearer token.
    #[must_use]
    pub fn auth(token: &str) -> Self {
        Self {
            action: "auth".to_owned(),
            token: Some(token.to_owned()),
            topic: None,
        }
    }

    /// Ask the server to start delivering events for a topic.
    #[must_use]
    pub fn subscribe(topic: &str) -> Self {
        Self {
            action: "subscribe".to_owned(),
            token: None,
            topic: Some(topic.to_owned()),
        }
    }

    /// Ask the server to stop delivering events for a topic.
    #[must_use]
    pub fn unsubscribe(topic: &str) -> Self {
        Self {
            action: "unsubscribe".to_owned(),
            token: None,
            topic: Some(topic.to_owned()),
        }
    }
}

/// Body for `POST /assistant/chat-bot`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantRequest {
    pub message: String,
    pub user_id: Option<String>,
    pub conversation_id: Option<String>,
}

/// Reply from the assistant service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantResponse {
    /// Threading id; sticky for the rest of the widget mount once returned.
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub message: AssistantMessage,
}

/// The assistant's generated turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub id: String,
    pub content: String,
    pub created_at: String,
}
