//! Tool domain traits
//!
//! Contains pure domain logic traits for argument validation.

use super::entities::{Arguments, ToolDefinition};

/// Validator for tool call arguments
///
/// This is a pure domain trait that checks arguments against a tool's
/// declared parameters without any I/O.
pub trait ToolValidator: Send + Sync {
    /// Validate arguments against a tool definition
    fn validate(&self, arguments: &Arguments, definition: &ToolDefinition) -> Result<(), String>;
}

/// Default implementation of ToolValidator
///
/// Rejects missing required parameters, unknown parameters, and values
/// whose JSON type does not match the declared type hint.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, arguments: &Arguments, definition: &ToolDefinition) -> Result<(), String> {
        for param in &definition.parameters {
            if param.required && !arguments.contains_key(&param.name) {
                return Err(format!(
                    "Missing required parameter '{}' for tool '{}'",
                    param.name, definition.name
                ));
            }
        }

        // Sorted so the reported error is deterministic
        let mut names: Vec<&String> = arguments.keys().collect();
        names.sort();

        for name in names {
            let Some(param) = definition.parameter(name) else {
                return Err(format!(
                    "Unknown parameter '{}' for tool '{}'",
                    name, definition.name
                ));
            };

            let value = &arguments[name];
            if !type_matches(&param.param_type, value) {
                return Err(format!(
                    "Parameter '{}' for tool '{}' must be of type {}",
                    name, definition.name, param.param_type
                ));
            }
        }

        Ok(())
    }
}

fn type_matches(param_type: &str, value: &serde_json::Value) -> bool {
    match param_type {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        // Unknown hints are not enforced
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolParameter;

    fn definition() -> ToolDefinition {
        ToolDefinition::new("create_event", "Create a calendar event")
            .with_parameter(ToolParameter::new("title", "Event title", true))
            .with_parameter(
                ToolParameter::new("duration", "Minutes", false).with_type("integer"),
            )
    }

    fn args(pairs: &[(&str, serde_json::Value)]) -> Arguments {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_validator_missing_required() {
        let result = DefaultToolValidator.validate(&Arguments::new(), &definition());
        assert!(result.unwrap_err().contains("Missing required parameter 'title'"));
    }

    #[test]
    fn test_validator_unknown_param() {
        let arguments = args(&[
            ("title", serde_json::json!("Standup")),
            ("location", serde_json::json!("Room 1")),
        ]);
        let result = DefaultToolValidator.validate(&arguments, &definition());
        assert!(result.unwrap_err().contains("Unknown parameter 'location'"));
    }

    #[test]
    fn test_validator_type_mismatch() {
        let arguments = args(&[
            ("title", serde_json::json!("Standup")),
            ("duration", serde_json::json!("thirty")),
        ]);
        let result = DefaultToolValidator.validate(&arguments, &definition());
        assert!(result.unwrap_err().contains("must be of type integer"));
    }

    #[test]
    fn test_validator_valid_call() {
        let arguments = args(&[
            ("title", serde_json::json!("Standup")),
            ("duration", serde_json::json!(15)),
        ]);
        assert!(DefaultToolValidator.validate(&arguments, &definition()).is_ok());
    }
}
