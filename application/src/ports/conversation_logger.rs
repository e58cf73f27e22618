//! Transcript port
//!
//! A chat turn emits a fixed sequence of [`ConversationEvent`]s:
//!
//! ```text
//! chat_started → completion_response → (tool_call → tool_result)* →
//!     completion_response → chat_completed | chat_failed
//! ```
//!
//! Diagnostics go through `tracing`; this port records what was said and
//! which tools ran, for replay or audit.

use serde_json::Value;

/// What happened in a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ChatStarted,
    CompletionResponse,
    ToolCall,
    ToolResult,
    ChatCompleted,
    ChatFailed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ChatStarted => "chat_started",
            EventKind::CompletionResponse => "completion_response",
            EventKind::ToolCall => "tool_call",
            EventKind::ToolResult => "tool_result",
            EventKind::ChatCompleted => "chat_completed",
            EventKind::ChatFailed => "chat_failed",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ConversationEvent {
    pub kind: EventKind,
    /// Event-specific fields; adapters flatten objects into the record.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self { kind, payload }
    }
}

/// Sink for transcript events.
///
/// `log` never fails from the caller's point of view; adapters report
/// their own write errors.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every event.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
