//! Cache persistence port
//!
//! A [`CacheStore`] loads and saves [`CacheSnapshot`]s so cached tool
//! results survive process restarts.

use crate::guards::response_cache::{CacheError, CacheSnapshot};

/// Persistent storage for response cache snapshots
pub trait CacheStore: Send + Sync {
    /// Load the stored snapshot, `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<CacheSnapshot>, CacheError>;

    /// Replace the stored snapshot.
    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), CacheError>;
}
