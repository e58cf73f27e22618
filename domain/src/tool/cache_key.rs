//! Canonical cache keys for tool calls
//!
//! Two calls with the same qualified tool name and the same arguments must
//! map to the same key regardless of argument order, including the order of
//! keys in nested objects.

use serde::{Deserialize, Serialize};

use super::entities::Arguments;

/// Canonical signature of `(qualified tool name, sorted arguments)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the key for a tool call
    pub fn for_call(qualified_name: &str, arguments: &Arguments) -> Self {
        let mut names: Vec<&String> = arguments.keys().collect();
        names.sort();

        let mut canonical = String::with_capacity(qualified_name.len() + 32);
        canonical.push_str(qualified_name);
        canonical.push('(');
        for (i, name) in names.into_iter().enumerate() {
            if i > 0 {
                canonical.push(',');
            }
            // serde_json string escaping keeps names containing '=' or ',' unambiguous
            canonical.push_str(&serde_json::Value::String(name.clone()).to_string());
            canonical.push('=');
            write_canonical(&arguments[name], &mut canonical);
        }
        canonical.push(')');

        Self(canonical)
    }

    /// Wrap an already-canonical key (e.g., from a persisted snapshot)
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn write_canonical(value: &serde_json::Value, out: &mut String) {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        serde_json::Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
