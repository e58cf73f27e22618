//! TTL response cache for successful tool results.
//!
//! Entries are keyed by [`CacheKey`], the canonical signature of a qualified
//! tool name and its arguments. An entry is readable while
//! `now - stored_at < ttl`; expired entries count as misses and are dropped
//! on read or by [`ResponseCache::purge_expired`].

use crate::ports::clock::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use toolmesh_domain::CacheKey;
use tracing::{debug, trace};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Cache failures. Callers treat every one of them as a miss.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache lock poisoned")]
    LockPoisoned,

    #[error("Unsupported cache snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Cache snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache snapshot format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Versioned, schema-checked persistent form of the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub version: u32,
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub key: CacheKey,
    pub value: Value,
    pub stored_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub hit_rate: f64,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(self.stored_at).to_std() {
            Ok(age) => age < self.ttl,
            // stored_at lies in the future
            Err(_) => true,
        }
    }
}

/// Process-wide cache shared by all sessions.
pub struct ResponseCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    /// Create a cache whose entries live for `ttl`, timed by the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<CacheKey, CacheEntry>>, CacheError> {
        self.entries.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Get a live cached value.
    pub fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError> {
        let now = self.clock.now();
        let mut entries = self.lock()?;

        let hit = match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                trace!(key = %key, "Dropping expired cache entry");
                entries.remove(key);
                None
            }
            None => None,
        };

        if hit.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        Ok(hit)
    }

    /// Store a value stamped with the current time.
    pub fn set(&self, key: CacheKey, value: Value) -> Result<(), CacheError> {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
            ttl: self.ttl,
        };
        self.lock()?.insert(key, entry);
        Ok(())
    }

    /// Remove every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = self.clock.now();
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, "Purged expired cache entries");
        }
        Ok(purged)
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        self.lock()?.clear();
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        CacheStats {
            hits,
            misses,
            entries: self.len(),
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// Capture the live entries, ordered by key.
    pub fn snapshot(&self) -> Result<CacheSnapshot, CacheError> {
        let now = self.clock.now();
        let entries = self.lock()?;

        let mut snapshot_entries: Vec<SnapshotEntry> = entries
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, entry)| SnapshotEntry {
                key: key.clone(),
                value: entry.value.clone(),
                stored_at: entry.stored_at,
                ttl_seconds: entry.ttl.as_secs(),
            })
            .collect();
        snapshot_entries.sort_by(|a, b| a.key.cmp(&b.key));

        Ok(CacheSnapshot {
            version: SNAPSHOT_VERSION,
            entries: snapshot_entries,
        })
    }

    /// Load entries from a snapshot, skipping expired ones.
    ///
    /// Returns the number of entries restored.
    pub fn restore(&self, snapshot: CacheSnapshot) -> Result<usize, CacheError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CacheError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let now = self.clock.now();
        let mut entries = self.lock()?;
        let mut restored = 0;
        for item in snapshot.entries {
            let entry = CacheEntry {
                value: item.value,
                stored_at: item.stored_at,
                ttl: Duration::from_secs(item.ttl_seconds),
            };
            if entry.is_live(now) {
                entries.insert(item.key, entry);
                restored += 1;
            }
        }
        debug!(restored, "Restored cache snapshot");
        Ok(restored)
    }
}
