//! Persistence adapters

mod json_cache_store;

pub use json_cache_store::JsonCacheStore;
