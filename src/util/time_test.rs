use super::*;
use crate::net::types::MessageType;
use crate::state::chat::{ChatMessage, Direction};

fn msg(id: &str, created_at: &str) -> Message {
    Message::Chat(ChatMessage {
        id: id.to_owned(),
        sender_id: "u-1".to_owned(),
        content: "x".to_owned(),
        message_type: MessageType::Text,
        created_at: created_at.to_owned(),
        is_read: true,
        direction: Direction::Sent,
    })
}

// =============================================================
// Formatting
// =============================================================

#[test]
fn time_hhmm_slices_the_clock_part() {
    assert_eq!(time_hhmm("2025-03-01T09:15:00"), "09:15");
    assert_eq!(time_hhmm("2025-03-01T23:05:59.123Z"), "23:05");
}

#[test]
fn time_hhmm_tolerates_malformed_input() {
    assert_eq!(time_hhmm("not a timestamp"), "");
    assert_eq!(time_hhmm(""), "");
}

#[test]
fn date_key_is_the_date_part() {
    assert_eq!(date_key("2025-03-01T09:15:00"), "2025-03-01");
    assert_eq!(date_key("2025-03-01"), "2025-03-01");
}

#[test]
fn day_label_prefers_relative_names() {
    assert_eq!(day_label("2025-03-01", "2025-03-01", "2025-02-28"), "Hôm nay");
    assert_eq!(day_label("2025-02-28", "2025-03-01", "2025-02-28"), "Hôm qua");
    assert_eq!(day_label("2025-01-15", "2025-03-01", "2025-02-28"), "15/01/2025");
}

// =============================================================
// Grouping
// =============================================================

#[test]
fn group_by_day_buckets_consecutive_days() {
    let messages = vec![
        msg("m-1", "2025-02-28T08:00:00"),
        msg("m-2", "2025-02-28T09:00:00"),
        msg("m-3", "2025-03-01T10:00:00"),
    ];
    let groups = group_by_day(&messages);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0, "2025-02-28");
    assert_eq!(groups[0].1.len(), 2);
    assert_eq!(groups[1].0, "2025-03-01");
    assert_eq!(groups[1].1.len(), 1);
}

#[test]
fn group_by_day_preserves_arrival_order() {
    let messages = vec![
        msg("m-1", "2025-02-28T08:00:00"),
        msg("m-2", "2025-03-01T10:00:00"),
    ];
    let groups = group_by_day(&messages);
    assert_eq!(groups[0].1[0].id(), "m-1");
    assert_eq!(groups[1].1[0].id(), "m-2");
}

#[test]
fn native_build_has_no_clock() {
    assert_eq!(now_iso(), "");
    assert_eq!(today_and_yesterday_keys(), (String::new(), String::new()));
}
