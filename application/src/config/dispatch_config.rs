//! Dispatch configuration - engine and guard parameters.
//!
//! [`DispatchConfig`] groups the static parameters of a
//! [`DispatchEngine`](crate::use_cases::dispatch::DispatchEngine): the model
//! identifier, conversation window size, cache TTL, rate limit and the
//! time bounds of a chat call.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use toolmesh_domain::conversation::state::DEFAULT_CAPACITY;

/// Which calls share a rate window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitScope {
    /// One window per provider
    #[default]
    PerProvider,
    /// A single window for every provider
    Global,
}

/// Fixed-window rate limit parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Calls granted per window before callers are suspended.
    pub calls_per_window: u32,
    /// Length of one window.
    pub window: Duration,
    pub scope: RateLimitScope,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            calls_per_window: 10,
            window: Duration::from_secs(1),
            scope: RateLimitScope::PerProvider,
        }
    }
}

impl RateLimitConfig {
    pub fn new(calls_per_window: u32, window: Duration) -> Self {
        Self {
            calls_per_window,
            window,
            scope: RateLimitScope::PerProvider,
        }
    }

    pub fn with_scope(mut self, scope: RateLimitScope) -> Self {
        self.scope = scope;
        self
    }
}

/// Dispatch engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Completion model identifier, reported by `summary()`.
    pub model: String,
    /// Maximum conversation entries kept per session.
    pub window_size: usize,
    /// Time-to-live of cached tool results.
    pub cache_ttl: Duration,
    pub rate_limit: RateLimitConfig,
    /// Deadline applied to every chat call that does not carry its own.
    pub chat_deadline: Option<Duration>,
    /// Upper bound for a single provider execution.
    pub tool_timeout: Duration,
    /// Execute the tool calls of one turn concurrently.
    pub concurrent_tools: bool,
    /// Override of the dispatch system prompt.
    pub system_prompt: Option<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            window_size: DEFAULT_CAPACITY,
            cache_ttl: Duration::from_secs(3600),
            rate_limit: RateLimitConfig::default(),
            chat_deadline: None,
            tool_timeout: Duration::from_secs(30),
            concurrent_tools: true,
            system_prompt: None,
        }
    }
}

impl DispatchConfig {
    // ==================== Builder Methods ====================

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_chat_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.chat_deadline = deadline;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_concurrent_tools(mut self, concurrent: bool) -> Self {
        self.concurrent_tools = concurrent;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = DispatchConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.window_size, 30);
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.rate_limit.calls_per_window, 10);
        assert_eq!(config.rate_limit.scope, RateLimitScope::PerProvider);
        assert!(config.chat_deadline.is_none());
        assert!(config.concurrent_tools);
    }

    #[test]
    fn test_builder() {
        let config = DispatchConfig::default()
            .with_model("gpt-4o")
            .with_window_size(20)
            .with_rate_limit(
                RateLimitConfig::new(2, Duration::from_millis(500))
                    .with_scope(RateLimitScope::Global),
            )
            .with_concurrent_tools(false);

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.window_size, 20);
        assert_eq!(config.rate_limit.window, Duration::from_millis(500));
        assert_eq!(config.rate_limit.scope, RateLimitScope::Global);
        assert!(!config.concurrent_tools);
    }
}
