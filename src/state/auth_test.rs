use super::*;

// =============================================================
// AuthState defaults
// =============================================================

#[test]
fn auth_state_default_has_no_identity() {
    let state = AuthState::default();
    assert!(state.identity.is_none());
}

#[test]
fn auth_state_default_not_loading() {
    let state = AuthState::default();
    assert!(!state.loading);
}

// =============================================================
// Storage access
// =============================================================

#[test]
fn stored_identity_is_none_outside_the_browser() {
    assert!(stored_identity().is_none());
    assert!(stored_token().is_none());
}
