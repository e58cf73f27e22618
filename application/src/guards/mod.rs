//! Guards around provider execution
//!
//! Process-wide, shared by every session:
//!
//! - [`RateLimiter`] - fixed-window call budget per provider (or global)
//! - [`ResponseCache`] - TTL cache of successful tool results

pub mod rate_limiter;
pub mod response_cache;

pub use rate_limiter::RateLimiter;
pub use response_cache::{CacheError, CacheSnapshot, CacheStats, ResponseCache, SnapshotEntry};
