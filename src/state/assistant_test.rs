use super::*;

const TS: &str = "2025-03-01T09:00:00";

fn ts() -> String {
    TS.to_owned()
}

// =============================================================
// Keyword matching
// =============================================================

#[test]
fn matches_are_case_insensitive() {
    assert_eq!(match_category("SIZE nào vừa với tôi"), Some(Category::Size));
    assert_eq!(match_category("Xin Chào shop"), Some(Category::Greeting));
}

#[test]
fn first_category_in_fixed_order_wins() {
    // Contains both a size and a shipping keyword; size is checked first.
    assert_eq!(
        match_category("tôi cần tư vấn size và ship"),
        Some(Category::Size)
    );
}

#[test]
fn shipping_matches_without_earlier_categories() {
    assert_eq!(match_category("phí ship đi Đà Nẵng"), Some(Category::Shipping));
}

#[test]
fn admin_keywords_route_to_admin() {
    assert_eq!(match_category("cho tôi gặp admin"), Some(Category::Admin));
    assert_eq!(match_category("tôi muốn gặp tư vấn viên"), Some(Category::Admin));
}

#[test]
fn unmatched_message_has_no_category() {
    assert_eq!(match_category("giá sản phẩm này có thể giảm không"), None);
}

#[test]
fn category_tables_are_nonempty() {
    for category in CATEGORY_ORDER {
        assert!(!category.keywords().is_empty());
        assert!(!category.canned_response().is_empty());
    }
}

// =============================================================
// Routing decisions
// =============================================================

#[test]
fn empty_input_records_no_turn() {
    assert_eq!(route_message(""), None);
    assert_eq!(route_message("   \n\t "), None);
}

#[test]
fn canned_categories_bypass_the_ai() {
    assert_eq!(
        route_message("bảng size áo thun"),
        Some(RouteDecision::Canned(Category::Size))
    );
    assert_eq!(
        route_message("chính sách đổi trả thế nào"),
        Some(RouteDecision::Canned(Category::Return))
    );
}

#[test]
fn admin_match_becomes_a_transfer() {
    assert_eq!(
        route_message("cho tôi gặp admin"),
        Some(RouteDecision::TransferToAdmin)
    );
}

#[test]
fn unmatched_input_delegates_to_ai() {
    assert_eq!(
        route_message("giá sản phẩm này có thể giảm không"),
        Some(RouteDecision::DelegateToAi)
    );
}

// =============================================================
// Transcript state
// =============================================================

#[test]
fn greeting_is_seeded_exactly_once() {
    let mut state = AssistantState::default();
    assert!(state.greet_once(ts()));
    assert!(!state.greet_once(ts()));
    assert_eq!(state.turns.len(), 1);
    assert_eq!(state.turns[0].author, Author::Bot);
    assert_eq!(state.turns[0].origin, Some(Origin::Canned));
}

#[test]
fn user_turn_is_recorded_before_the_reply() {
    let mut state = AssistantState::default();
    state.push_user("size nào vừa".to_owned(), ts());
    state.push_canned(Category::Size, ts());
    assert_eq!(state.turns.len(), 2);
    assert_eq!(state.turns[0].author, Author::User);
    assert_eq!(state.turns[1].content, Category::Size.canned_response());
}

#[test]
fn first_ai_reply_adopts_the_conversation_id() {
    let mut state = AssistantState::default();
    assert!(state.conversation_id.is_none());
    state.push_ai("Dạ có ạ".to_owned(), Some("c-9".to_owned()), ts());
    assert_eq!(state.conversation_id.as_deref(), Some("c-9"));
}

#[test]
fn later_replies_keep_the_sticky_conversation_id() {
    let mut state = AssistantState::default();
    state.push_ai("một".to_owned(), Some("c-9".to_owned()), ts());
    state.push_ai("hai".to_owned(), None, ts());
    assert_eq!(state.conversation_id.as_deref(), Some("c-9"));
}

#[test]
fn offline_fallback_flags_the_turn_and_banner() {
    let mut state = AssistantState::default();
    state.push_offline(ts());
    assert_eq!(state.turns.len(), 1);
    assert_eq!(state.turns[0].origin, Some(Origin::Error));
    assert_eq!(state.turns[0].content, OFFLINE_RESPONSE);
    assert!(state.error.is_some());
}

#[test]
fn widget_errors_stay_inside_the_widget() {
    let mut state = AssistantState::default();
    state.push_offline(ts());
    // The admin-chat session state is a separate type entirely; the only
    // shared surface is the navigation path constant.
    assert_eq!(ADMIN_CHAT_PATH, "/profile/admin-chat");
}
