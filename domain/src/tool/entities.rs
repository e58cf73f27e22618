//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Arguments payload of a tool call (parameter name → JSON value)
pub type Arguments = HashMap<String, serde_json::Value>;

/// Declared schema of a tool exposed by a capability provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Local name of the tool within its provider (e.g., "send_message")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Parameter specifications, in declaration order
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Parameter type hint: "string", "number", "integer", "boolean", "object", "array"
    pub param_type: String,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Render the parameter list as a JSON Schema object.
    ///
    /// Unknown type hints fall back to `"string"`.
    pub fn parameters_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let schema_type = match param.param_type.as_str() {
                "number" => "number",
                "integer" => "integer",
                "boolean" => "boolean",
                "object" => "object",
                "array" => "array",
                _ => "string",
            };

            properties.insert(
                param.name.clone(),
                serde_json::json!({
                    "type": schema_type,
                    "description": param.description,
                }),
            );

            if param.required {
                required.push(serde_json::json!(param.name));
            }
        }

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// A tool call request produced by the completion service
///
/// `tool_name` is the globally qualified name (`provider_tool`); the
/// registry splits it back into provider and local tool name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque call identifier assigned by the completion service
    pub id: String,
    /// Qualified tool name
    pub tool_name: String,
    /// Arguments passed to the tool
    #[serde(default)]
    pub arguments: Arguments,
    /// Set when the service sent arguments that could not be decoded;
    /// such a call fails with `INVALID_ARGUMENT` without executing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_error: Option<String>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
            argument_error: None,
        }
    }

    pub fn with_argument_error(mut self, reason: impl Into<String>) -> Self {
        self.argument_error = Some(reason.into());
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definition() {
        let tool = ToolDefinition::new("send_email", "Send an email")
            .with_parameter(ToolParameter::new("to", "Recipient", true))
            .with_parameter(ToolParameter::new("cc", "Copy", false));

        assert_eq!(tool.name, "send_email");
        assert_eq!(tool.parameters.len(), 2);
        assert!(tool.parameter("to").unwrap().required);
        assert!(tool.parameter("bcc").is_none());
    }

    #[test]
    fn test_parameters_schema() {
        let tool = ToolDefinition::new("search", "Search repositories")
            .with_parameter(ToolParameter::new("query", "Search query", true))
            .with_parameter(
                ToolParameter::new("limit", "Max results", false).with_type("integer"),
            )
            .with_parameter(ToolParameter::new("odd", "Odd type", false).with_type("path"));

        let schema = tool.parameters_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["query"]["type"], "string");
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
        assert_eq!(schema["properties"]["odd"]["type"], "string");

        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 1);
        assert_eq!(required[0], "query");
    }

    #[test]
    fn test_tool_call() {
        let call = ToolCall::new("call_1", "slack_send_message")
            .with_arg("channel", "general")
            .with_arg("message", "hi");

        assert_eq!(call.id, "call_1");
        assert_eq!(call.get_string("channel"), Some("general"));
        assert_eq!(call.get_string("missing"), None);
    }
}
