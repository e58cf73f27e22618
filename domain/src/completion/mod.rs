//! Completion protocol types
//!
//! Minimal request/response contract with the external completion service:
//! a [`CompletionRequest`] carries the system prompt, conversation window,
//! tool catalog and [`ToolChoice`]; a [`CompletionResponse`] carries text
//! and/or tool call requests.

pub mod request;
pub mod response;

pub use request::{CompletionRequest, ToolChoice};
pub use response::{CompletionResponse, ContentBlock, StopReason};
