use super::*;

const ME: &str = "u-1";
const ADMIN: &str = "admin-1";

fn dto(id: &str, sender: &str) -> MessageDto {
    MessageDto {
        id: id.to_owned(),
        room_id: "r-1".to_owned(),
        sender_id: sender.to_owned(),
        content: format!("msg {id}"),
        message_type: MessageType::Text,
        created_at: "2025-03-01T09:15:00".to_owned(),
        is_read: false,
    }
}

fn ready_state() -> ChatState {
    let mut state = ChatState::default();
    assert!(state.begin_initialize(true));
    state.finish_initialize(
        ChatRoom {
            id: "r-1".to_owned(),
            user_id: Some(ME.to_owned()),
        },
        Vec::new(),
        ME,
    );
    state.finish_connect(true);
    state.subscribed = true;
    state
}

// =============================================================
// Initialization
// =============================================================

#[test]
fn begin_initialize_without_identity_records_unauthenticated() {
    let mut state = ChatState::default();
    assert!(!state.begin_initialize(false));
    assert_eq!(state.phase, ChatPhase::Failed);
    assert_eq!(state.error, Some(ChatError::Unauthenticated));
}

#[test]
fn begin_initialize_is_guarded_while_loading() {
    let mut state = ChatState::default();
    assert!(state.begin_initialize(true));
    assert_eq!(state.phase, ChatPhase::Loading);
    assert!(!state.begin_initialize(true));
}

#[test]
fn begin_initialize_allows_retry_after_failure() {
    let mut state = ChatState::default();
    assert!(state.begin_initialize(true));
    state.fail_initialize();
    assert_eq!(state.error, Some(ChatError::RoomUnavailable));
    assert!(state.begin_initialize(true));
    assert!(state.error.is_none());
}

#[test]
fn finish_initialize_counts_unread_counterpart_messages() {
    let mut state = ChatState::default();
    assert!(state.begin_initialize(true));

    let mut read = dto("m-1", ADMIN);
    read.is_read = true;
    let history = vec![read, dto("m-2", ADMIN), dto("m-3", ME), dto("m-4", ADMIN)];
    state.finish_initialize(
        ChatRoom {
            id: "r-1".to_owned(),
            user_id: None,
        },
        history,
        ME,
    );

    assert_eq!(state.phase, ChatPhase::Ready);
    assert_eq!(state.messages.len(), 4);
    assert_eq!(state.unread_count, 2);
}

#[test]
fn finish_initialize_tags_directions_once() {
    let mut state = ChatState::default();
    assert!(state.begin_initialize(true));
    state.finish_initialize(
        ChatRoom {
            id: "r-1".to_owned(),
            user_id: None,
        },
        vec![dto("m-1", ME), dto("m-2", ADMIN)],
        ME,
    );

    assert!(state.messages[0].is_sent());
    assert!(!state.messages[1].is_sent());
}

// =============================================================
// Connection attempts
// =============================================================

#[test]
fn begin_connect_rejects_concurrent_attempts() {
    let mut state = ChatState::default();
    assert!(state.begin_connect());
    assert_eq!(state.connection, ConnectionStatus::Connecting);
    assert!(!state.begin_connect());

    state.finish_connect(true);
    assert!(!state.begin_connect());
}

#[test]
fn failed_connect_surfaces_retryable_error() {
    let mut state = ChatState::default();
    assert!(state.begin_connect());
    state.finish_connect(false);
    assert_eq!(state.connection, ConnectionStatus::Disconnected);
    assert_eq!(state.error, Some(ChatError::ConnectionFailed));

    assert!(state.begin_connect());
    state.finish_connect(true);
    assert!(state.error.is_none());
}

#[test]
fn connection_lost_clears_subscription_guard() {
    let mut state = ready_state();
    state.connection_lost();
    assert_eq!(state.connection, ConnectionStatus::Disconnected);
    assert!(!state.subscribed);
}

// =============================================================
// Incoming messages
// =============================================================

#[test]
fn duplicate_delivery_is_idempotent() {
    let mut state = ready_state();
    assert!(state.apply_incoming(dto("m-1", ADMIN), ME, true));
    assert!(!state.apply_incoming(dto("m-1", ADMIN), ME, true));
    assert_eq!(state.messages.len(), 1);
}

#[test]
fn optimistic_send_then_echo_converges_to_one_entry() {
    let mut state = ready_state();
    assert!(state.record_sent(dto("m-7", ME), ME));
    // The push channel later echoes the same message.
    assert!(!state.apply_incoming(dto("m-7", ME), ME, true));
    assert_eq!(state.messages.len(), 1);
    assert!(state.messages[0].is_sent());
}

#[test]
fn echo_then_rest_response_also_converges() {
    let mut state = ready_state();
    assert!(state.apply_incoming(dto("m-7", ME), ME, true));
    assert!(!state.record_sent(dto("m-7", ME), ME));
    assert_eq!(state.messages.len(), 1);
}

#[test]
fn counterpart_messages_count_unread_while_viewer_absent() {
    let mut state = ready_state();
    for i in 0..3 {
        assert!(state.apply_incoming(dto(&format!("m-{i}"), ADMIN), ME, false));
    }
    assert_eq!(state.unread_count, 3);
}

#[test]
fn counterpart_messages_do_not_count_unread_while_viewer_present() {
    let mut state = ready_state();
    assert!(state.apply_incoming(dto("m-1", ADMIN), ME, true));
    assert_eq!(state.unread_count, 0);
}

#[test]
fn own_echo_never_counts_unread() {
    let mut state = ready_state();
    assert!(state.apply_incoming(dto("m-1", ME), ME, false));
    assert_eq!(state.unread_count, 0);
}

// =============================================================
// Read bookkeeping
// =============================================================

#[test]
fn mark_read_resets_counter_and_flags() {
    let mut state = ready_state();
    assert!(state.apply_incoming(dto("m-1", ADMIN), ME, false));
    assert!(state.apply_incoming(dto("m-2", ADMIN), ME, false));
    assert_eq!(state.unread_count, 2);

    assert!(state.should_mark_read());
    state.clear_unread();
    assert_eq!(state.unread_count, 0);
    // Nothing left unread: a second trigger must not persist again.
    assert!(!state.should_mark_read());
}

#[test]
fn should_mark_read_requires_a_room() {
    let mut state = ChatState::default();
    state.subscribed = true;
    state.unread_count = 3;
    assert!(!state.should_mark_read());
}

#[test]
fn read_receipt_marks_only_sent_messages() {
    let mut state = ready_state();
    assert!(state.apply_incoming(dto("m-1", ME), ME, true));
    assert!(state.apply_incoming(dto("m-2", ADMIN), ME, false));

    state.apply_read_receipt();

    let read_flags: Vec<bool> = state
        .messages
        .iter()
        .map(|m| match m {
            Message::Chat(c) => c.is_read,
            Message::System(_) => unreachable!("no system messages here"),
        })
        .collect();
    assert_eq!(read_flags, vec![true, false]);
    // Delivery ticks do not touch the unread counter.
    assert_eq!(state.unread_count, 1);
}

// =============================================================
// System notices
// =============================================================

#[test]
fn system_messages_get_unique_local_ids() {
    let mut state = ready_state();
    state.add_system_message("Mất kết nối", "2025-03-01T10:00:00".to_owned());
    state.add_system_message("Đã kết nối lại", "2025-03-01T10:01:00".to_owned());
    assert_eq!(state.messages.len(), 2);
    assert_ne!(state.messages[0].id(), state.messages[1].id());
    assert!(!state.messages[0].is_sent());
}

// =============================================================
// Teardown
// =============================================================

#[test]
fn events_after_teardown_are_dropped() {
    let mut state = ready_state();
    assert!(state.apply_incoming(dto("m-1", ADMIN), ME, false));
    state.teardown();

    assert!(!state.apply_incoming(dto("m-2", ADMIN), ME, false));
    state.apply_read_receipt();

    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.unread_count, 1);
}

#[test]
fn teardown_invalidates_inflight_generations() {
    let mut state = ready_state();
    let generation = state.generation;
    assert!(state.is_current(generation));
    state.teardown();
    assert!(!state.is_current(generation));
}

#[test]
fn teardown_keeps_room_and_messages_for_caller() {
    let mut state = ready_state();
    assert!(state.apply_incoming(dto("m-1", ADMIN), ME, true));
    state.teardown();
    assert!(state.room.is_some());
    assert_eq!(state.messages.len(), 1);
}
