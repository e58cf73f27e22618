//! Tool domain module
//!
//! This module defines how a language model reaches **capabilities** exposed
//! by independent providers: every tool is declared by a [`ToolDefinition`],
//! published through the [`CapabilityRegistry`] under a qualified name,
//! requested via a [`ToolCall`], and answered by exactly one [`ToolCallResult`].
//!
//! ```text
//! ┌──────────────────┐    ┌──────────────┐    ┌────────────────┐
//! │ CapabilityRegistry│───▶│ ToolCall     │───▶│ ToolCallResult │
//! │ (catalog)        │    │ (request)    │    │ (outcome)      │
//! └────────┬─────────┘    └──────────────┘    └────────────────┘
//!          │
//!          ├─ "slack_send_message"  → (slack, send_message)
//!          └─ "github_create_issue" → (github, create_issue)
//! ```
//!
//! # Key Types
//!
//! - [`CapabilityProvider`] - named source of tools
//! - [`CapabilityRegistry`] - owns providers, builds the catalog, resolves names
//! - [`ToolDefinition`] - schema for a single tool
//! - [`ToolCall`] - a request with call id and arguments
//! - [`ToolCallResult`] - success payload or [`ToolError`]
//! - [`ToolValidator`] - pure argument validation
//! - [`CacheKey`] - canonical signature used by the response cache

pub mod cache_key;
pub mod entities;
pub mod provider;
pub mod qualified;
pub mod registry;
pub mod traits;
pub mod value_objects;

pub use cache_key::CacheKey;
pub use entities::{Arguments, ToolCall, ToolDefinition, ToolParameter};
pub use provider::CapabilityProvider;
pub use registry::{CapabilityRegistry, CatalogEntry, RegistryError, ResolvedTool};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolCallResult, ToolError, ToolResultMetadata};
