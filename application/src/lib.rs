//! Application layer for toolmesh
//!
//! This crate contains the dispatch engine, the guards that protect provider
//! calls (rate limiter, response cache), and port definitions for the
//! completion service, conversation logging, cache persistence and time.
//! It depends only on the domain layer.

pub mod config;
pub mod guards;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DispatchConfig, RateLimitConfig, RateLimitScope};
pub use guards::{CacheError, CacheSnapshot, CacheStats, RateLimiter, ResponseCache};
pub use ports::{
    cache_store::CacheStore,
    clock::{Clock, SystemClock},
    completion_service::{CompletionError, CompletionService},
    conversation_logger::{ConversationEvent, ConversationLogger, EventKind, NoConversationLogger},
};
pub use use_cases::dispatch::{
    ChatError, ChatOptions, ChatReply, ChatSession, ConversationSummary, DispatchEngine,
    DispatchPhase,
};
