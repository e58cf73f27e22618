//! Domain layer for toolmesh
//!
//! This crate contains the core types and pure logic of the tool-invocation
//! orchestration layer. It has no dependencies on infrastructure concerns.
//!
//! # Core Concepts
//!
//! ## Capabilities
//!
//! Independent providers expose named tools. The [`CapabilityRegistry`]
//! publishes them under qualified names (`provider_tool`) and resolves those
//! names back to a provider and local tool.
//!
//! ## Conversation
//!
//! Each session owns a bounded [`ConversationState`]; the oldest non-system
//! entries are evicted first.
//!
//! ## Completion protocol
//!
//! A [`CompletionRequest`] offers the conversation window and tool catalog;
//! a [`CompletionResponse`] answers with text and/or tool call requests.

pub mod completion;
pub mod conversation;
pub mod prompt;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use completion::{CompletionRequest, CompletionResponse, ContentBlock, StopReason, ToolChoice};
pub use conversation::{ConversationEntry, ConversationState, Role};
pub use prompt::PromptTemplate;
pub use tool::{
    Arguments, CacheKey, CapabilityProvider, CapabilityRegistry, CatalogEntry,
    DefaultToolValidator, RegistryError, ResolvedTool, ToolCall, ToolCallResult, ToolDefinition,
    ToolError, ToolParameter, ToolResultMetadata, ToolValidator,
};
