//! Dispatch-related sections: `[conversation]`, `[cache]`, `[rate_limit]`, `[dispatch]`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use toolmesh_application::RateLimitScope;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConversationConfig {
    /// Maximum entries kept per conversation
    pub window_size: usize,
    /// Replaces the generated dispatch prompt
    pub system_prompt: Option<String>,
}

impl Default for FileConversationConfig {
    fn default() -> Self {
        Self {
            window_size: 30,
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub ttl_seconds: u64,
    /// Snapshot file; the cache is memory-only when unset
    pub path: Option<PathBuf>,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 3600,
            path: None,
        }
    }
}

/// ```toml
/// [rate_limit]
/// calls_per_window = 10
/// window_ms = 1000
/// scope = "per_provider"   # or "global"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRateLimitConfig {
    pub calls_per_window: u32,
    pub window_ms: u64,
    pub scope: RateLimitScope,
}

impl Default for FileRateLimitConfig {
    fn default() -> Self {
        Self {
            calls_per_window: 10,
            window_ms: 1000,
            scope: RateLimitScope::PerProvider,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDispatchConfig {
    /// Deadline for a whole chat call
    pub deadline_seconds: Option<u64>,
    /// Bound for a single provider execution
    pub tool_timeout_seconds: u64,
    pub concurrent_tools: bool,
}

impl Default for FileDispatchConfig {
    fn default() -> Self {
        Self {
            deadline_seconds: None,
            tool_timeout_seconds: 30,
            concurrent_tools: true,
        }
    }
}
