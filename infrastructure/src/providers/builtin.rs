//! Built-in provider
//!
//! Local tools that need no external service: arithmetic, the wall clock,
//! and an echo tool for exercising the dispatch path.

use async_trait::async_trait;
use serde_json::Value;
use toolmesh_domain::{Arguments, CapabilityProvider, ToolDefinition, ToolError, ToolParameter};

use super::expression::{self, format_number};

/// Provider name under which the built-in tools are registered
pub const BUILTIN_PROVIDER: &str = "builtin";

pub const CALCULATE: &str = "calculate";
pub const GET_CURRENT_TIME: &str = "get_current_time";
pub const ECHO: &str = "echo";

/// Format used by `get_current_time`
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Provider exposing `calculate`, `get_current_time` and `echo`.
#[derive(Debug, Clone)]
pub struct BuiltinProvider {
    tools: Vec<ToolDefinition>,
}

impl BuiltinProvider {
    pub fn new() -> Self {
        Self {
            tools: vec![
                ToolDefinition::new(CALCULATE, "Perform basic mathematical calculations")
                    .with_parameter(ToolParameter::new(
                        "expression",
                        "Arithmetic expression using numbers, + - * / and parentheses (e.g. '2 + 3 * 4')",
                        true,
                    )),
                ToolDefinition::new(GET_CURRENT_TIME, "Get the current date and time"),
                ToolDefinition::new(ECHO, "Echo back the input message (for testing)")
                    .with_parameter(ToolParameter::new("message", "Message to echo back", true)),
            ],
        }
    }
}

impl Default for BuiltinProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn string_arg<'a>(arguments: &'a Arguments, name: &str) -> Result<&'a str, ToolError> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::invalid_argument(format!("'{}' must be a string", name)))
}

fn calculate(arguments: &Arguments) -> Result<Value, ToolError> {
    let input = string_arg(arguments, "expression")?;
    let value = expression::evaluate(input)
        .map_err(|e| ToolError::invalid_argument(format!("Cannot evaluate '{}': {}", input, e)))?;
    Ok(Value::String(format!("Result: {}", format_number(value))))
}

fn get_current_time() -> Value {
    Value::String(chrono::Local::now().format(TIME_FORMAT).to_string())
}

fn echo(arguments: &Arguments) -> Result<Value, ToolError> {
    let message = string_arg(arguments, "message")?;
    Ok(Value::String(format!("Echo: {}", message)))
}

#[async_trait]
impl CapabilityProvider for BuiltinProvider {
    fn name(&self) -> &str {
        BUILTIN_PROVIDER
    }

    fn description(&self) -> &str {
        "Local utilities: calculator, clock, echo"
    }

    fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    async fn execute(&self, local_name: &str, arguments: &Arguments) -> Result<Value, ToolError> {
        match local_name {
            CALCULATE => calculate(arguments),
            GET_CURRENT_TIME => Ok(get_current_time()),
            ECHO => echo(arguments),
            other => Err(ToolError::not_found(format!("tool '{}'", other))),
        }
    }
}
