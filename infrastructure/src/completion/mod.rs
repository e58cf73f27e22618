//! Completion service adapters

pub mod openai;

pub use openai::{CompletionSetupError, OpenAiCompletionService};
