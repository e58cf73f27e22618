//! Command provider configuration (`[providers.<name>]` sections)
//!
//! Each section registers one capability provider whose tools run shell
//! command templates. `{param_name}` placeholders are replaced with the
//! shell-escaped argument values at execution time.
//!
//! ```toml
//! [providers.gh]
//! description = "GitHub via the gh CLI"
//!
//! [providers.gh.tools.create_issue]
//! description = "Create a GitHub issue in the current repository"
//! command = "gh issue create --title {title} --body {body}"
//!
//! [providers.gh.tools.create_issue.parameters.title]
//! type = "string"
//! description = "Issue title"
//! required = true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use toolmesh_domain::{ToolDefinition, ToolParameter};

/// One tool parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileToolParameter {
    /// Parameter type: "string", "number", "integer", "boolean", "object", "array"
    #[serde(rename = "type", default = "default_string_type")]
    pub param_type: String,
    #[serde(default)]
    pub description: String,
    /// Whether this parameter is required (default: true)
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_string_type() -> String {
    "string".to_string()
}

fn default_true() -> bool {
    true
}

/// One command-backed tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCommandToolConfig {
    pub description: String,
    /// Command template with `{param_name}` placeholders
    pub command: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, FileToolParameter>,
}

impl FileCommandToolConfig {
    /// Build the tool definition; parameters are declared in name order.
    pub fn to_definition(&self, name: &str) -> ToolDefinition {
        self.parameters
            .iter()
            .fold(
                ToolDefinition::new(name, &self.description),
                |def, (param_name, param)| {
                    def.with_parameter(
                        ToolParameter::new(param_name, &param.description, param.required)
                            .with_type(&param.param_type),
                    )
                },
            )
    }
}

/// One command provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCommandProviderConfig {
    pub description: String,
    pub tools: BTreeMap<String, FileCommandToolConfig>,
}
