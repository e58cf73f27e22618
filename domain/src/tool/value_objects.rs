//! Tool domain value objects - immutable result and error types
//!
//! Every tool call request yields exactly one [`ToolCallResult`], even when
//! the tool could not be resolved or executed. Failures carry a
//! [`ToolError`] whose code identifies the failure class:
//!
//! | Code | Raised when |
//! |------|-------------|
//! | `NOT_FOUND` | Provider or local tool does not exist |
//! | `MALFORMED_NAME` | Qualified name lacks the provider separator |
//! | `INVALID_ARGUMENT` | Arguments do not match the declared parameters |
//! | `EXECUTION_FAILED` | The provider reported an error |
//! | `TIMEOUT` | The deadline elapsed while the provider was executing |
//! | `RATE_LIMIT_TIMEOUT` | The deadline elapsed while waiting for rate-limit capacity |

use serde::{Deserialize, Serialize};

pub const NOT_FOUND: &str = "NOT_FOUND";
pub const MALFORMED_NAME: &str = "MALFORMED_NAME";
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
pub const EXECUTION_FAILED: &str = "EXECUTION_FAILED";
pub const TIMEOUT: &str = "TIMEOUT";
pub const RATE_LIMIT_TIMEOUT: &str = "RATE_LIMIT_TIMEOUT";

/// Error that occurred while resolving or executing a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "INVALID_ARGUMENT")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(NOT_FOUND, format!("Not found: {}", resource.into()))
    }

    pub fn malformed_name(name: impl Into<String>) -> Self {
        Self::new(
            MALFORMED_NAME,
            format!("Invalid tool name format: {}", name.into()),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(INVALID_ARGUMENT, message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new(EXECUTION_FAILED, message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            TIMEOUT,
            format!("Operation timed out: {}", operation.into()),
        )
    }

    pub fn rate_limit_timeout(provider: impl Into<String>) -> Self {
        Self::new(
            RATE_LIMIT_TIMEOUT,
            format!(
                "Deadline elapsed while waiting for rate limit capacity on provider '{}'",
                provider.into()
            ),
        )
    }

    pub fn is_timeout(&self) -> bool {
        self.code == TIMEOUT || self.code == RATE_LIMIT_TIMEOUT
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Outcome of a single tool call request.
///
/// Carries either an output payload (`success == true`) or an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Identifier of the originating call
    pub call_id: String,
    /// Qualified name of the tool that was requested
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Output payload (for successful execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    /// Error information (for failed execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    /// Metadata about the execution
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

/// Execution metadata attached to a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Duration of execution in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Served from the response cache
    #[serde(default)]
    pub cached: bool,
}

impl ToolCallResult {
    /// Create a successful result
    pub fn success(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        output: serde_json::Value,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            success: true,
            output: Some(output),
            error: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    /// Create a failed result
    pub fn failure(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        error: ToolError,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            success: false,
            output: None,
            error: Some(error),
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.metadata.duration_ms = Some(duration_ms);
        self
    }

    pub fn from_cache(mut self) -> Self {
        self.metadata.cached = true;
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn output(&self) -> Option<&serde_json::Value> {
        self.output.as_ref()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    /// Render the result as conversation content for a `tool` entry.
    ///
    /// String outputs are used verbatim; other JSON values are serialized.
    pub fn to_content(&self) -> String {
        match (&self.output, &self.error) {
            (Some(serde_json::Value::String(s)), _) if self.success => s.clone(),
            (Some(value), _) if self.success => value.to_string(),
            (_, Some(error)) => format!("Error: {}", error),
            _ => "Error: tool produced no output".to_string(),
        }
    }
}
