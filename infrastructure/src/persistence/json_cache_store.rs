//! JSON file store for response cache snapshots

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use toolmesh_application::{CacheError, CacheSnapshot, CacheStore};
use tracing::debug;

/// Stores the snapshot as pretty-printed JSON at a fixed path.
///
/// Saves go to a sibling temp file that is renamed over the target, so a
/// crash mid-write never leaves a truncated snapshot behind.
#[derive(Debug, Clone)]
pub struct JsonCacheStore {
    path: PathBuf,
}

impl JsonCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "cache.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CacheStore for JsonCacheStore {
    fn load(&self) -> Result<Option<CacheSnapshot>, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: CacheSnapshot = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), entries = snapshot.entries.len(), "Loaded cache snapshot");
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        {
            let mut file = fs::File::create(&temp)?;
            serde_json::to_writer_pretty(&mut file, snapshot)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;

        debug!(path = %self.path.display(), entries = snapshot.entries.len(), "Saved cache snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use toolmesh_application::guards::SnapshotEntry;
    use toolmesh_domain::CacheKey;

    fn snapshot() -> CacheSnapshot {
        CacheSnapshot {
            version: 1,
            entries: vec![SnapshotEntry {
                key: CacheKey::from_raw("builtin_echo:{\"message\":\"hi\"}"),
                value: json!("Echo: hi"),
                stored_at: Utc::now(),
                ttl_seconds: 3600,
            }],
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCacheStore::new(dir.path().join("cache.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCacheStore::new(dir.path().join("nested/cache.json"));
        let saved = snapshot();

        store.save(&saved).unwrap();
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().unwrap(), Some(saved));
    }

    #[test]
    fn test_save_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCacheStore::new(dir.path().join("cache.json"));
        store.save(&snapshot()).unwrap();

        let empty = CacheSnapshot {
            version: 1,
            entries: Vec::new(),
        };
        store.save(&empty).unwrap();
        assert_eq!(store.load().unwrap(), Some(empty));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonCacheStore::new(path).load().unwrap_err();
        assert!(matches!(err, CacheError::Format(_)));
    }
}
