//! Completion response types.
//!
//! A completion service answers with an ordered list of content blocks
//! mixing text and tool call requests:
//!
//! ```text
//! { text }                          → final answer, no tools
//! { text?, tool_call_requests: [..] } → tools requested
//! ```

use crate::tool::entities::{Arguments, ToolCall};
use serde::{Deserialize, Serialize};

/// A single block of content within a completion response.
///
/// # Examples
///
/// ```
/// use toolmesh_domain::completion::ContentBlock;
///
/// let text = ContentBlock::Text("Let me check the channels.".to_string());
/// assert!(text.as_text().is_some());
///
/// let tool = ContentBlock::ToolUse {
///     id: "call_abc123".to_string(),
///     name: "slack_get_channels".to_string(),
///     input: Default::default(),
/// };
/// assert!(tool.as_tool_use().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentBlock {
    /// A text content block from the model.
    Text(String),

    /// A tool call request from the model.
    ToolUse {
        /// Service-assigned ID correlating the request with its result.
        id: String,
        /// Qualified tool name.
        name: String,
        /// Structured arguments.
        input: Arguments,
    },

    /// A tool call request whose arguments could not be decoded.
    MalformedToolUse {
        id: String,
        name: String,
        reason: String,
    },
}

impl ContentBlock {
    /// Returns the text content if this is a `Text` block.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `(id, name, input)` if this is a `ToolUse` block.
    pub fn as_tool_use(&self) -> Option<(&str, &str, &Arguments)> {
        match self {
            ContentBlock::ToolUse { id, name, input } => Some((id, name, input)),
            _ => None,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response
    EndTurn,
    /// The model wants tools executed
    ToolUse,
    /// Hit the token limit; the response may be truncated
    MaxTokens,
    /// Service-specific stop reason
    Other(String),
}

/// A structured response from the completion service.
///
/// # Examples
///
/// ```
/// use toolmesh_domain::completion::{CompletionResponse, ContentBlock, StopReason};
///
/// let response = CompletionResponse::from_text("Hello!");
/// assert_eq!(response.text_content(), "Hello!");
/// assert!(!response.has_tool_calls());
///
/// let response = CompletionResponse {
///     content: vec![
///         ContentBlock::Text("Sending...".to_string()),
///         ContentBlock::ToolUse {
///             id: "call_1".to_string(),
///             name: "slack_send_message".to_string(),
///             input: [("channel".to_string(), serde_json::json!("general"))]
///                 .into_iter().collect(),
///         },
///     ],
///     stop_reason: Some(StopReason::ToolUse),
///     model: Some("gpt-4o-mini".to_string()),
/// };
/// assert!(response.has_tool_calls());
/// assert_eq!(response.tool_calls()[0].id, "call_1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Content blocks in the response (text and/or tool use).
    pub content: Vec<ContentBlock>,
    /// Why the model stopped generating.
    pub stop_reason: Option<StopReason>,
    /// Model identifier (if returned by the service).
    pub model: Option<String>,
}

impl CompletionResponse {
    /// Create a text-only response.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text(text.into())],
            stop_reason: Some(StopReason::EndTurn),
            model: None,
        }
    }

    /// Create a response requesting tool calls, with optional leading text.
    pub fn with_tool_calls(text: Option<String>, calls: Vec<ToolCall>) -> Self {
        let mut content: Vec<ContentBlock> = text.into_iter().map(ContentBlock::Text).collect();
        content.extend(calls.into_iter().map(|call| match call.argument_error {
            Some(reason) => ContentBlock::MalformedToolUse {
                id: call.id,
                name: call.tool_name,
                reason,
            },
            None => ContentBlock::ToolUse {
                id: call.id,
                name: call.tool_name,
                input: call.arguments,
            },
        }));
        Self {
            content,
            stop_reason: Some(StopReason::ToolUse),
            model: None,
        }
    }

    /// Concatenate all `Text` content blocks into a single string.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| b.as_text())
            .collect::<Vec<_>>()
            .join("")
    }

    /// Extract all `ToolUse` content blocks as `Vec<ToolCall>`, in order.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { id, name, input } => {
                    Some(ToolCall::new(id.as_str(), name.as_str()).with_arguments(input.clone()))
                }
                ContentBlock::MalformedToolUse { id, name, reason } => Some(
                    ToolCall::new(id.as_str(), name.as_str()).with_argument_error(reason.as_str()),
                ),
                _ => None,
            })
            .collect()
    }

    /// Returns `true` if the response contains any tool call requests.
    pub fn has_tool_calls(&self) -> bool {
        self.content
            .iter()
            .any(|b| {
                matches!(
                    b,
                    ContentBlock::ToolUse { .. } | ContentBlock::MalformedToolUse { .. }
                )
            })
    }

    /// A response with neither text nor tool calls carries nothing usable.
    pub fn is_empty(&self) -> bool {
        !self.has_tool_calls() && self.text_content().trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_creates_text_only_response() {
        let response = CompletionResponse::from_text("Hello, world!");
        assert_eq!(response.text_content(), "Hello, world!");
        assert!(!response.has_tool_calls());
        assert!(response.tool_calls().is_empty());
        assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
        assert!(!response.is_empty());
    }

    #[test]
    fn tool_calls_extraction_preserves_order() {
        let response = CompletionResponse {
            content: vec![
                ContentBlock::Text("Let me do both.".to_string()),
                ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "slack_send_message".to_string(),
                    input: [("channel".to_string(), serde_json::json!("general"))]
                        .into_iter()
                        .collect(),
                },
                ContentBlock::ToolUse {
                    id: "call_2".to_string(),
                    name: "google_create_calendar_event".to_string(),
                    input: [("title".to_string(), serde_json::json!("Standup"))]
                        .into_iter()
                        .collect(),
                },
            ],
            stop_reason: Some(StopReason::ToolUse),
            model: None,
        };

        let calls = response.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].get_string("channel"), Some("general"));
        assert_eq!(calls[1].tool_name, "google_create_calendar_event");
        assert_eq!(response.text_content(), "Let me do both.");
    }

    #[test]
    fn with_tool_calls_builder() {
        let response = CompletionResponse::with_tool_calls(
            None,
            vec![ToolCall::new("c1", "builtin_echo").with_arg("message", "hi")],
        );
        assert!(response.has_tool_calls());
        assert_eq!(response.text_content(), "");
        assert_eq!(response.tool_calls()[0].get_string("message"), Some("hi"));
    }

    #[test]
    fn malformed_tool_use_is_still_a_tool_call() {
        let response = CompletionResponse {
            content: vec![ContentBlock::MalformedToolUse {
                id: "call_1".to_string(),
                name: "builtin_echo".to_string(),
                reason: "expected value at line 1".to_string(),
            }],
            stop_reason: Some(StopReason::ToolUse),
            model: None,
        };

        assert!(response.has_tool_calls());
        assert!(!response.is_empty());
        let calls = response.tool_calls();
        assert_eq!(calls[0].tool_name, "builtin_echo");
        assert!(calls[0].arguments.is_empty());
        assert_eq!(
            calls[0].argument_error.as_deref(),
            Some("expected value at line 1")
        );
    }

    #[test]
    fn empty_response() {
        let response = CompletionResponse {
            content: vec![ContentBlock::Text("   ".to_string())],
            stop_reason: None,
            model: None,
        };
        assert!(response.is_empty());
    }
}
