//! Reusable view components for the chat surfaces.

pub mod admin_chat;
pub mod chat_widget;
