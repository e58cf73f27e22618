//! Logging configuration (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily-rolling diagnostic logs
    pub dir: Option<PathBuf>,
    /// JSONL conversation transcript file
    pub conversation_log: Option<PathBuf>,
}
