//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types with
//! [`FileConfig::dispatch_config`].

mod completion;
mod dispatch;
mod logging;
mod providers;

pub use completion::FileCompletionConfig;
pub use dispatch::{
    FileCacheConfig, FileConversationConfig, FileDispatchConfig, FileRateLimitConfig,
};
pub use logging::FileLoggingConfig;
pub use providers::{FileCommandProviderConfig, FileCommandToolConfig, FileToolParameter};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use toolmesh_application::{DispatchConfig, RateLimitConfig};
use toolmesh_domain::tool::qualified;

/// Configuration validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("conversation.window_size cannot be 0")]
    ZeroWindowSize,

    #[error("rate_limit.calls_per_window cannot be 0")]
    ZeroCallsPerWindow,

    #[error("rate_limit.window_ms cannot be 0")]
    ZeroWindow,

    #[error("dispatch.tool_timeout_seconds cannot be 0")]
    ZeroToolTimeout,

    #[error("completion.model cannot be empty")]
    EmptyModelName,

    #[error("invalid provider name '{0}': must be non-empty and must not contain '_'")]
    InvalidProviderName(String),

    #[error("tool '{tool}' of provider '{provider}' has an empty command")]
    EmptyCommand { provider: String, tool: String },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Completion backend
    pub completion: FileCompletionConfig,
    /// Conversation window
    pub conversation: FileConversationConfig,
    /// Response cache
    pub cache: FileCacheConfig,
    /// Provider rate limiting
    pub rate_limit: FileRateLimitConfig,
    /// Chat deadlines and tool execution
    pub dispatch: FileDispatchConfig,
    /// Diagnostic and transcript logs
    pub logging: FileLoggingConfig,
    /// Command providers, keyed by provider name
    pub providers: BTreeMap<String, FileCommandProviderConfig>,
}

impl FileConfig {
    /// Validate the configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.conversation.window_size == 0 {
            return Err(ConfigValidationError::ZeroWindowSize);
        }
        if self.rate_limit.calls_per_window == 0 {
            return Err(ConfigValidationError::ZeroCallsPerWindow);
        }
        if self.rate_limit.window_ms == 0 {
            return Err(ConfigValidationError::ZeroWindow);
        }
        if self.dispatch.tool_timeout_seconds == 0 {
            return Err(ConfigValidationError::ZeroToolTimeout);
        }
        if self.completion.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }

        for (name, provider) in &self.providers {
            if !qualified::is_valid_provider_name(name) {
                return Err(ConfigValidationError::InvalidProviderName(name.clone()));
            }
            for (tool, config) in &provider.tools {
                if config.command.trim().is_empty() {
                    return Err(ConfigValidationError::EmptyCommand {
                        provider: name.clone(),
                        tool: tool.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Convert to the application-layer engine configuration.
    pub fn dispatch_config(&self) -> DispatchConfig {
        let rate_limit = RateLimitConfig::new(
            self.rate_limit.calls_per_window,
            Duration::from_millis(self.rate_limit.window_ms),
        )
        .with_scope(self.rate_limit.scope);

        let config = DispatchConfig::default()
            .with_model(&self.completion.model)
            .with_window_size(self.conversation.window_size)
            .with_cache_ttl(Duration::from_secs(self.cache.ttl_seconds))
            .with_rate_limit(rate_limit)
            .with_chat_deadline(self.dispatch.deadline_seconds.map(Duration::from_secs))
            .with_tool_timeout(Duration::from_secs(self.dispatch.tool_timeout_seconds))
            .with_concurrent_tools(self.dispatch.concurrent_tools);

        match &self.conversation.system_prompt {
            Some(prompt) => config.with_system_prompt(prompt),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolmesh_application::RateLimitScope;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[completion]
model = "gpt-4o"
timeout_seconds = 120

[conversation]
window_size = 20
system_prompt = "Be brief."

[cache]
ttl_seconds = 60
path = "/tmp/toolmesh-cache.json"

[rate_limit]
calls_per_window = 5
window_ms = 2000
scope = "global"

[dispatch]
deadline_seconds = 45
concurrent_tools = false

[logging]
conversation_log = "/tmp/transcript.jsonl"

[providers.gh]
description = "GitHub via the gh CLI"

[providers.gh.tools.list_issues]
description = "List open issues"
command = "gh issue list --limit {limit}"

[providers.gh.tools.list_issues.parameters.limit]
type = "integer"
description = "Maximum issues"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.completion.model, "gpt-4o");
        assert_eq!(config.completion.timeout_seconds, 120);
        assert_eq!(config.completion.max_tokens, 500);
        assert_eq!(config.conversation.window_size, 20);
        assert_eq!(config.rate_limit.scope, RateLimitScope::Global);
        assert_eq!(config.dispatch.deadline_seconds, Some(45));
        assert_eq!(config.dispatch.tool_timeout_seconds, 30);
        assert!(config.logging.dir.is_none());
        assert_eq!(
            config.providers["gh"].tools["list_issues"].parameters["limit"].param_type,
            "integer"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.conversation.window_size, 30);
        assert_eq!(config.cache.ttl_seconds, 3600);
        assert_eq!(config.rate_limit.calls_per_window, 10);
        assert!(config.dispatch.concurrent_tools);
        assert!(config.providers.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_dispatch_config_conversion() {
        let toml_str = r#"
[conversation]
window_size = 12
system_prompt = "Use tools sparingly."

[rate_limit]
calls_per_window = 3
window_ms = 250

[dispatch]
deadline_seconds = 10
tool_timeout_seconds = 5
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let dispatch = config.dispatch_config();

        assert_eq!(dispatch.model, "gpt-4o-mini");
        assert_eq!(dispatch.window_size, 12);
        assert_eq!(dispatch.rate_limit.calls_per_window, 3);
        assert_eq!(dispatch.rate_limit.window, Duration::from_millis(250));
        assert_eq!(dispatch.chat_deadline, Some(Duration::from_secs(10)));
        assert_eq!(dispatch.tool_timeout, Duration::from_secs(5));
        assert_eq!(dispatch.system_prompt.as_deref(), Some("Use tools sparingly."));
    }

    #[test]
    fn test_validate_zero_values() {
        let mut config = FileConfig::default();
        config.conversation.window_size = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroWindowSize));

        let mut config = FileConfig::default();
        config.rate_limit.calls_per_window = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroCallsPerWindow));

        let mut config = FileConfig::default();
        config.rate_limit.window_ms = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroWindow));

        let mut config = FileConfig::default();
        config.dispatch.tool_timeout_seconds = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroToolTimeout));
    }

    #[test]
    fn test_validate_empty_model_name() {
        let toml_str = r#"
[completion]
model = "  "
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyModelName));
    }

    #[test]
    fn test_validate_provider_name_with_separator() {
        let toml_str = r#"
[providers.my_tools.tools.run]
description = "Run"
command = "true"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidProviderName(
                "my_tools".to_string()
            ))
        );
    }

    #[test]
    fn test_validate_empty_command() {
        let toml_str = r#"
[providers.shell.tools.noop]
description = "Nothing"
command = ""
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyCommand { .. })
        ));
    }
}
