//! Capability provider abstraction
//!
//! A [`CapabilityProvider`] is a named source of tools (an external service
//! binding, a local built-in set, a set of shell commands). Providers are
//! registered once in the [`CapabilityRegistry`](super::registry::CapabilityRegistry)
//! and are immutable afterwards.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   CapabilityRegistry                        │
//! │  (qualified name "slack_send_message" → slack/send_message) │
//! └─────────────────────────────────────────────────────────────┘
//!           │              │              │
//!           ▼              ▼              ▼
//!    ┌──────────┐   ┌──────────┐   ┌──────────┐
//!    │ builtin  │   │  slack   │   │  github  │
//!    └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! The registry performs explicit lookup-and-dispatch: it resolves the
//! provider by name and calls [`CapabilityProvider::execute`] with the local
//! tool name. Providers never see qualified names.

use async_trait::async_trait;

use super::entities::{Arguments, ToolDefinition};
use super::value_objects::ToolError;

/// A named source of tools.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// Unique provider name. Must not contain the qualified-name separator.
    fn name(&self) -> &str;

    /// Short description of the service this provider binds to
    fn description(&self) -> &str {
        ""
    }

    /// Tools exposed by this provider, in declaration order
    fn tools(&self) -> &[ToolDefinition];

    /// Look up a tool definition by local name
    fn tool(&self, local_name: &str) -> Option<&ToolDefinition> {
        self.tools().iter().find(|t| t.name == local_name)
    }

    /// Execute a tool by its local name.
    ///
    /// Arguments have already been validated against the tool's declared
    /// parameters. The returned value is the structured result payload.
    async fn execute(
        &self,
        local_name: &str,
        arguments: &Arguments,
    ) -> Result<serde_json::Value, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolParameter;

    struct MockProvider {
        tools: Vec<ToolDefinition>,
    }

    #[async_trait]
    impl CapabilityProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn tools(&self) -> &[ToolDefinition] {
            &self.tools
        }

        async fn execute(
            &self,
            local_name: &str,
            arguments: &Arguments,
        ) -> Result<serde_json::Value, ToolError> {
            match local_name {
                "echo" => Ok(arguments
                    .get("message")
                    .cloned()
                    .unwrap_or(serde_json::Value::Null)),
                other => Err(ToolError::not_found(other)),
            }
        }
    }

    fn provider() -> MockProvider {
        MockProvider {
            tools: vec![
                ToolDefinition::new("echo", "Echo a message")
                    .with_parameter(ToolParameter::new("message", "Message", true)),
            ],
        }
    }

    #[test]
    fn test_default_tool_lookup() {
        let provider = provider();
        assert!(provider.tool("echo").is_some());
        assert!(provider.tool("missing").is_none());
        assert_eq!(provider.description(), "");
    }

    #[tokio::test]
    async fn test_provider_execute() {
        let provider = provider();
        let mut args = Arguments::new();
        args.insert("message".into(), serde_json::json!("hello"));

        let value = provider.execute("echo", &args).await.unwrap();
        assert_eq!(value, serde_json::json!("hello"));

        let err = provider.execute("nope", &args).await.unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
    }
}
