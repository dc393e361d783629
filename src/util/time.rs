//! Timestamp helpers for the chat threads.
//!
//! Backend timestamps are RFC 3339-ish strings (`2025-03-01T09:15:00`).
//! The helpers here slice them as text so the thread grouping and labels
//! are testable without a browser clock; only [`now_iso`] and
//! [`today_and_yesterday_keys`] touch `js_sys::Date`.

#[cfg(test)]
#[path = "time_test.rs"]
mod time_test;

use crate::state::chat::Message;

/// `HH:MM` for a message bubble. Empty when the timestamp is malformed.
#[must_use]
pub fn time_hhmm(created_at: &str) -> String {
    created_at
        .split_once('T')
        .map(|(_, rest)| rest.chars().take(5).collect())
        .unwrap_or_default()
}

/// The `YYYY-MM-DD` part of a timestamp.
#[must_use]
pub fn date_key(created_at: &str) -> &str {
    created_at.split('T').next().unwrap_or(created_at)
}

/// Date separator label: "Hôm nay", "Hôm qua", or `dd/mm/yyyy`.
#[must_use]
pub fn day_label(key: &str, today_key: &str, yesterday_key: &str) -> String {
    if key == today_key {
        return "Hôm nay".to_owned();
    }
    if key == yesterday_key {
        return "Hôm qua".to_owned();
    }
    let mut parts = key.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(year), Some(month), Some(day)) => format!("{day}/{month}/{year}"),
        _ => key.to_owned(),
    }
}

/// Group a thread by calendar day, preserving arrival order.
#[must_use]
pub fn group_by_day(messages: &[Message]) -> Vec<(String, Vec<&Message>)> {
    let mut groups: Vec<(String, Vec<&Message>)> = Vec::new();
    for msg in messages {
        let key = date_key(msg.created_at()).to_owned();
        match groups.last_mut() {
            Some((last_key, bucket)) if *last_key == key => bucket.push(msg),
            _ => groups.push((key, vec![msg])),
        }
    }
    groups
}

/// Current instant as an ISO string. Empty outside the browser.
#[must_use]
pub fn now_iso() -> String {
    #[cfg(feature = "hydrate")]
    {
        String::from(js_sys::Date::new_0().to_iso_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        String::new()
    }
}

/// Today's and yesterday's date keys in the browser clock. Empty keys
/// outside the browser, which simply disables the "Hôm nay"/"Hôm qua"
/// labels.
#[must_use]
pub fn today_and_yesterday_keys() -> (String, String) {
    #[cfg(feature = "hydrate")]
    {
        let now = js_sys::Date::new_0();
        let yesterday = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(
            now.get_time() - 86_400_000.0,
        ));
        (
            date_key(&String::from(now.to_iso_string())).to_owned(),
            date_key(&String::from(yesterday.to_iso_string())).to_owned(),
        )
    }
    #[cfg(not(feature = "hydrate"))]
    {
        (String::new(), String::new())
    }
}
