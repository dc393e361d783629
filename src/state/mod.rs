//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by domain (`auth`, `chat`, `assistant`) so individual
//! components can depend on small focused models. The chat state machine
//! and the assistant router are pure and unit-tested natively; browser
//! access lives behind the `hydrate` feature.

pub mod assistant;
pub mod auth;
pub mod chat;
