//! Simulated service providers
//!
//! Stand-ins for Slack, Google and GitHub that answer with canned data after
//! a short delay. They let a fresh install exercise routing across several
//! namespaces (`slack_send_message`, `github_search_repositories`, ...)
//! without credentials. Enabled with `--demo`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use toolmesh_domain::{Arguments, CapabilityProvider, ToolDefinition, ToolError, ToolParameter};

/// Simulated round-trip latency of every call
const LATENCY: Duration = Duration::from_millis(100);

type Responder = fn(&str, &Arguments) -> Result<Value, ToolError>;

/// A provider answering from canned data.
pub struct SimulatedProvider {
    name: &'static str,
    description: &'static str,
    tools: Vec<ToolDefinition>,
    respond: Responder,
}

impl SimulatedProvider {
    pub fn slack() -> Self {
        Self {
            name: "slack",
            description: "Send messages, manage channels",
            tools: vec![
                ToolDefinition::new("send_message", "Send a message to a Slack channel")
                    .with_parameter(ToolParameter::new("channel", "Channel name or ID", true))
                    .with_parameter(ToolParameter::new("message", "Message content", true)),
                ToolDefinition::new("get_channels", "List all available Slack channels"),
            ],
            respond: slack,
        }
    }

    pub fn google() -> Self {
        Self {
            name: "google",
            description: "Gmail and Google Calendar",
            tools: vec![
                ToolDefinition::new("send_email", "Send an email via Gmail")
                    .with_parameter(ToolParameter::new("to", "Recipient email address", true))
                    .with_parameter(ToolParameter::new("subject", "Email subject", true))
                    .with_parameter(ToolParameter::new("body", "Email body", true)),
                ToolDefinition::new("create_calendar_event", "Create a Google Calendar event")
                    .with_parameter(ToolParameter::new("title", "Event title", true))
                    .with_parameter(ToolParameter::new(
                        "start_time",
                        "Event start time (ISO format)",
                        true,
                    ))
                    .with_parameter(ToolParameter::new(
                        "end_time",
                        "Event end time (ISO format)",
                        false,
                    ))
                    .with_parameter(ToolParameter::new("description", "Event description", false)),
            ],
            respond: google,
        }
    }

    pub fn github() -> Self {
        Self {
            name: "github",
            description: "Repositories and issues",
            tools: vec![
                ToolDefinition::new("search_repositories", "Search GitHub repositories")
                    .with_parameter(ToolParameter::new("query", "Search query", true))
                    .with_parameter(ToolParameter::new(
                        "language",
                        "Programming language filter",
                        false,
                    )),
                ToolDefinition::new("create_issue", "Create a GitHub issue")
                    .with_parameter(ToolParameter::new(
                        "repository",
                        "Repository name (owner/repo)",
                        true,
                    ))
                    .with_parameter(ToolParameter::new("title", "Issue title", true))
                    .with_parameter(ToolParameter::new("body", "Issue description", false)),
            ],
            respond: github,
        }
    }

    /// Every simulated provider, in registration order.
    pub fn all() -> Vec<Self> {
        vec![Self::slack(), Self::google(), Self::github()]
    }
}

fn arg<'a>(arguments: &'a Arguments, name: &str) -> &'a str {
    arguments.get(name).and_then(Value::as_str).unwrap_or_default()
}

fn unknown(tool: &str) -> ToolError {
    ToolError::not_found(format!("tool '{}'", tool))
}

fn slack(tool: &str, arguments: &Arguments) -> Result<Value, ToolError> {
    match tool {
        "send_message" => Ok(json!({
            "success": true,
            "message": format!("Message sent to {}", arg(arguments, "channel")),
            "content": arg(arguments, "message"),
        })),
        "get_channels" => Ok(json!({
            "channels": [
                {"id": "C123", "name": "general"},
                {"id": "C456", "name": "random"},
                {"id": "C789", "name": "announcements"},
            ]
        })),
        other => Err(unknown(other)),
    }
}

fn google(tool: &str, arguments: &Arguments) -> Result<Value, ToolError> {
    match tool {
        "send_email" => Ok(json!({
            "success": true,
            "message": format!("Email sent to {}", arg(arguments, "to")),
            "subject": arg(arguments, "subject"),
        })),
        "create_calendar_event" => Ok(json!({
            "success": true,
            "event_id": "event_123",
            "title": arg(arguments, "title"),
            "start_time": arg(arguments, "start_time"),
        })),
        other => Err(unknown(other)),
    }
}

fn github(tool: &str, arguments: &Arguments) -> Result<Value, ToolError> {
    match tool {
        "search_repositories" => Ok(json!({
            "query": arg(arguments, "query"),
            "repositories": [
                {"name": "mcp-tutorial", "description": "AI Agent Tutorial"},
                {"name": "awesome-mcp", "description": "MCP Resources"},
            ]
        })),
        "create_issue" => Ok(json!({
            "success": true,
            "issue_number": 42,
            "repository": arg(arguments, "repository"),
            "title": arg(arguments, "title"),
        })),
        other => Err(unknown(other)),
    }
}

#[async_trait]
impl CapabilityProvider for SimulatedProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    async fn execute(&self, local_name: &str, arguments: &Arguments) -> Result<Value, ToolError> {
        tokio::time::sleep(LATENCY).await;
        (self.respond)(local_name, arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use toolmesh_domain::CapabilityRegistry;
    use toolmesh_domain::tool::value_objects::NOT_FOUND;

    fn args(pairs: &[(&str, &str)]) -> Arguments {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[test]
    fn test_providers_route_under_their_namespaces() {
        let mut registry = CapabilityRegistry::new();
        for provider in SimulatedProvider::all() {
            registry.register(Arc::new(provider)).unwrap();
        }

        assert_eq!(registry.provider_names(), vec!["slack", "google", "github"]);
        let resolved = registry.resolve("google_create_calendar_event").unwrap();
        assert_eq!(resolved.provider_name(), "google");
        assert_eq!(resolved.local_name(), "create_calendar_event");
        assert!(registry.resolve("github_search_repositories").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slack_send_message() {
        let out = SimulatedProvider::slack()
            .execute("send_message", &args(&[("channel", "general"), ("message", "hi")]))
            .await
            .unwrap();
        assert_eq!(out["message"], "Message sent to general");
        assert_eq!(out["content"], "hi");
    }

    #[tokio::test(start_paused = true)]
    async fn test_github_create_issue() {
        let out = SimulatedProvider::github()
            .execute(
                "create_issue",
                &args(&[("repository", "acme/app"), ("title", "Crash on start")]),
            )
            .await
            .unwrap();
        assert_eq!(out["repository"], "acme/app");
        assert_eq!(out["issue_number"], 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_tool() {
        let err = SimulatedProvider::google()
            .execute("delete_everything", &Arguments::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, NOT_FOUND);
    }
}
