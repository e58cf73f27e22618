//! Completion service port
//!
//! Defines the interface for the external language-model backend that
//! proposes tool calls and final text.

use async_trait::async_trait;
use thiserror::Error;
use toolmesh_domain::{CompletionRequest, CompletionResponse};

/// Errors that can occur during a completion request
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Completion service returned an empty response")]
    EmptyResponse,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway to the completion backend
///
/// Implementations (adapters) live in the infrastructure layer. A call is
/// stateless: the whole conversation window travels in every request.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Model identifier used for completions
    fn model(&self) -> &str;

    /// Send one completion request
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError>;
}
