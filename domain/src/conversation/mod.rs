//! Conversation domain module
//!
//! A session's conversation is a bounded, ordered log of role-tagged
//! entries ([`ConversationEntry`]) held in a [`ConversationState`].
//! The state is owned per session and never shared across sessions.

pub mod entities;
pub mod state;

pub use entities::{ConversationEntry, Role};
pub use state::ConversationState;
