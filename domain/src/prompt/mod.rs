//! Prompt domain
//!
//! System instructions for the first (dispatch) and second (synthesis)
//! completion of a chat turn.

mod template;

pub use template::PromptTemplate;
