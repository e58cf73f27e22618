//! Completion service configuration (`[completion]` section)

use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completions endpoint settings.
///
/// ```toml
/// [completion]
/// model = "gpt-4o-mini"
/// api_key_env = "OPENAI_API_KEY"
/// timeout_seconds = 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCompletionConfig {
    /// Model identifier sent with every request
    pub model: String,
    /// Chat completions URL
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// HTTP request timeout
    pub timeout_seconds: u64,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for FileCompletionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_seconds: 60,
            max_tokens: 500,
            temperature: 0.7,
        }
    }
}
