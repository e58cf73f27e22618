//! Infrastructure layer for toolmesh
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration file loading, the HTTP
//! completion service, shipped capability providers, cache snapshot
//! persistence and the JSONL conversation transcript.

pub mod completion;
pub mod config;
pub mod logging;
pub mod persistence;
pub mod providers;

// Re-export commonly used types
pub use completion::{CompletionSetupError, OpenAiCompletionService};
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use logging::JsonlConversationLogger;
pub use persistence::JsonCacheStore;
pub use providers::{BUILTIN_PROVIDER, BuiltinProvider, CommandProvider, SimulatedProvider};
