use super::*;

// =============================================================
// MessageDto
// =============================================================

#[test]
fn message_dto_deserializes_backend_shape() {
    let json = serde_json::json!({
        "id": "m-1",
        "roomId": "r-1",
        "senderId": "u-1",
        "content": "xin chào",
        "messageType": "TEXT",
        "createdAt": "2025-03-01T09:15:00",
        "isRead": false
    });
    let msg: MessageDto = serde_json::from_value(json).expect("message dto");
    assert_eq!(msg.id, "m-1");
    assert_eq!(msg.room_id, "r-1");
    assert_eq!(msg.sender_id, "u-1");
    assert_eq!(msg.message_type, MessageType::Text);
    assert!(!msg.is_read);
}

#[test]
fn message_dto_defaults_missing_flags() {
    let json = serde_json::json!({
        "id": "m-2",
        "roomId": "r-1",
        "senderId": "u-2",
        "content": "https://cdn.example/anh.png",
        "createdAt": "2025-03-01T09:16:00"
    });
    let msg: MessageDto = serde_json::from_value(json).expect("message dto");
    assert_eq!(msg.message_type, MessageType::Text);
    assert!(!msg.is_read);
}

#[test]
fn message_type_uses_uppercase_wire_names() {
    assert_eq!(
        serde_json::to_value(MessageType::Image).expect("serialize"),
        serde_json::json!("IMAGE")
    );
    let parsed: MessageType = serde_json::from_value(serde_json::json!("TEXT")).expect("parse");
    assert_eq!(parsed, MessageType::Text);
}

#[test]
fn send_request_serializes_camel_case() {
    let req = SendMessageRequest {
        room_id: "r-1".to_owned(),
        content: "hello".to_owned(),
        message_type: MessageType::Text,
    };
    let value = serde_json::to_value(&req).expect("serialize");
    assert_eq!(
        value,
        serde_json::json!({"roomId": "r-1", "content": "hello", "messageType": "TEXT"})
    );
}

// =============================================================
// Push envelopes and client frames
// =============================================================

#[test]
fn push_envelope_parses_room_event() {
    let json = serde_json::json!({
        "event": "chat:message",
        "topic": "room/r-1",
        "data": {"id": "m-1"}
    });
    let env: PushEnvelope = serde_json::from_value(json).expect("envelope");
    assert_eq!(env.event, EVENT_MESSAGE);
    assert_eq!(env.topic.as_deref(), Some("room/r-1"));
}

#[test]
fn push_envelope_tolerates_missing_topic_and_data() {
    let env: PushEnvelope =
        serde_json::from_value(serde_json::json!({"event": "session:connected"})).expect("envelope");
    assert_eq!(env.event, EVENT_CONNECTED);
    assert!(env.topic.is_none());
    assert!(env.data.is_null());
}

#[test]
fn auth_frame_omits_topic() {
    let value = serde_json::to_value(ClientFrame::auth("tok-1")).expect("serialize");
    assert_eq!(value, serde_json::json!({"action": "auth", "token": "tok-1"}));
}

#[test]
fn subscribe_frame_omits_token() {
    let value = serde_json::to_value(ClientFrame::subscribe("room/r-1")).expect("serialize");
    assert_eq!(value, serde_json::json!({"action": "subscribe", "topic": "room/r-1"}));
}

// =============================================================
// Assistant contract
// =============================================================

#[test]
fn assistant_request_uses_snake_case() {
    let req = AssistantRequest {
        message: "giá bao nhiêu".to_owned(),
        user_id: None,
        conversation_id: Some("c-1".to_owned()),
    };
    let value = serde_json::to_value(&req).expect("serialize");
    assert_eq!(
        value,
        serde_json::json!({
            "message": "giá bao nhiêu",
            "user_id": null,
            "conversation_id": "c-1"
        })
    );
}

#[test]
fn assistant_response_parses_reply() {
    let json = serde_json::json!({
        "conversation_id": "c-9",
        "message": {"id": "am-1", "content": "Dạ có ạ", "created_at": "2025-03-01T09:20:00"}
    });
    let resp: AssistantResponse = serde_json::from_value(json).expect("response");
    assert_eq!(resp.conversation_id.as_deref(), Some("c-9"));
    assert_eq!(resp.message.content, "Dạ có ạ");
}
