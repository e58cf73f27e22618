//! Dispatch use case.
//!
//! Drives the two-phase completion protocol for one chat turn:
//!
//! ```text
//! AwaitingFirstCompletion ──(no tool calls)──────────────────────────▶ Done
//!          │
//!          └──(tool calls)──▶ ExecutingTools ──▶ AwaitingFinalCompletion ──▶ Done
//! ```
//!
//! [`DispatchEngine`] is shared by the whole process (completion service,
//! registry, rate limiter, response cache). [`ChatSession`] owns one
//! conversation; a `chat` call holds the session lock from start to finish,
//! so appends from concurrent calls on the same session never interleave.

use crate::config::DispatchConfig;
use crate::guards::{RateLimiter, ResponseCache};
use crate::ports::completion_service::{CompletionError, CompletionService};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, EventKind, NoConversationLogger,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use toolmesh_domain::util::truncate_str;
use toolmesh_domain::{
    CacheKey, CapabilityRegistry, CompletionRequest, CompletionResponse, ConversationEntry,
    ConversationState, DefaultToolValidator, PromptTemplate, ToolCall, ToolCallResult, ToolError,
    ToolValidator,
};
use tracing::{debug, info, trace, warn};

/// States of the two-phase protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPhase {
    AwaitingFirstCompletion,
    ExecutingTools,
    AwaitingFinalCompletion,
    Done,
}

impl DispatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchPhase::AwaitingFirstCompletion => "awaiting_first_completion",
            DispatchPhase::ExecutingTools => "executing_tools",
            DispatchPhase::AwaitingFinalCompletion => "awaiting_final_completion",
            DispatchPhase::Done => "done",
        }
    }
}

impl std::fmt::Display for DispatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that abort a chat call.
///
/// Tool failures never show up here; they become `tool` entries.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Completion service error: {0}")]
    CompletionService(#[from] CompletionError),

    #[error("Completion service timed out while {phase}")]
    CompletionServiceTimeout { phase: DispatchPhase },
}

/// Per-call options for [`ChatSession::chat_with_options`].
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Deadline relative to the start of the call. Falls back to
    /// [`DispatchConfig::chat_deadline`].
    pub deadline: Option<Duration>,
}

impl ChatOptions {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Outcome of a successful chat call.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Final assistant text.
    pub text: String,
    /// One result per requested tool call, in request order.
    pub tool_results: Vec<ToolCallResult>,
    /// Phases visited, ending with [`DispatchPhase::Done`].
    pub phases: Vec<DispatchPhase>,
}

/// Snapshot of a session for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub message_count: usize,
    pub tool_call_count: usize,
    pub providers: Vec<String>,
    pub model: String,
}

/// Process-wide dispatch engine.
pub struct DispatchEngine {
    completion: Arc<dyn CompletionService>,
    registry: Arc<CapabilityRegistry>,
    limiter: Arc<RateLimiter>,
    cache: Arc<ResponseCache>,
    validator: Arc<dyn ToolValidator>,
    conversation_logger: Arc<dyn ConversationLogger>,
    config: DispatchConfig,
}

impl DispatchEngine {
    /// Create an engine with a limiter and cache built from `config`.
    pub fn new(
        completion: Arc<dyn CompletionService>,
        registry: Arc<CapabilityRegistry>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            completion,
            registry,
            limiter: Arc::new(RateLimiter::new(config.rate_limit.clone())),
            cache: Arc::new(ResponseCache::new(config.cache_ttl)),
            validator: Arc::new(DefaultToolValidator),
            conversation_logger: Arc::new(NoConversationLogger),
            config,
        }
    }

    /// Share an existing cache (e.g., one restored from a snapshot).
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn ToolValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Open a new session with an empty conversation.
    pub fn new_session(self: &Arc<Self>) -> ChatSession {
        ChatSession::new(Arc::clone(self))
    }

    fn dispatch_prompt(&self) -> String {
        if let Some(prompt) = &self.config.system_prompt {
            return prompt.clone();
        }
        let services: Vec<(&str, &str)> = self
            .registry
            .providers()
            .map(|p| (p.name(), p.description()))
            .collect();
        PromptTemplate::dispatch_system(&services)
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        phase: DispatchPhase,
        deadline: Option<Instant>,
    ) -> Result<CompletionResponse, ChatError> {
        debug!(
            %phase,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending completion request"
        );

        let call = self.completion.complete(request);
        let response = match deadline {
            Some(at) => tokio::time::timeout_at(at, call)
                .await
                .map_err(|_| ChatError::CompletionServiceTimeout { phase })??,
            None => call.await?,
        };

        self.conversation_logger.log(ConversationEvent::new(
            EventKind::CompletionResponse,
            serde_json::json!({
                "phase": phase.as_str(),
                "text": response.text_content(),
                "tool_calls": response
                    .tool_calls()
                    .iter()
                    .map(|c| c.tool_name.as_str())
                    .collect::<Vec<_>>(),
            }),
        ));

        Ok(response)
    }

    /// Execute every call, returning results in request order.
    async fn execute_calls(&self, calls: &[ToolCall], deadline: Option<Instant>) -> Vec<ToolCallResult> {
        if self.config.concurrent_tools {
            futures::future::join_all(calls.iter().map(|call| self.execute_call(call, deadline)))
                .await
        } else {
            let mut results = Vec::with_capacity(calls.len());
            for call in calls {
                results.push(self.execute_call(call, deadline).await);
            }
            results
        }
    }

    /// resolve → validate → cache → limiter → execute → cache populate.
    async fn execute_call(&self, call: &ToolCall, deadline: Option<Instant>) -> ToolCallResult {
        let started = Instant::now();
        self.conversation_logger.log(ConversationEvent::new(
            EventKind::ToolCall,
            serde_json::json!({
                "call_id": call.id,
                "tool": call.tool_name,
                "arguments": call.arguments,
            }),
        ));

        let result = self.run_call(call, deadline).await;
        let result = if result.metadata.cached {
            result
        } else {
            result.with_duration(started.elapsed().as_millis() as u64)
        };

        match result.error() {
            Some(error) => warn!(call_id = %call.id, tool = %call.tool_name, %error, "Tool call failed"),
            None => debug!(
                call_id = %call.id,
                tool = %call.tool_name,
                cached = result.metadata.cached,
                "Tool call succeeded"
            ),
        }

        self.conversation_logger.log(ConversationEvent::new(
            EventKind::ToolResult,
            serde_json::json!({
                "call_id": call.id,
                "tool": call.tool_name,
                "success": result.is_success(),
                "cached": result.metadata.cached,
                "duration_ms": result.metadata.duration_ms,
                "content": result.to_content(),
            }),
        ));

        result
    }

    async fn run_call(&self, call: &ToolCall, deadline: Option<Instant>) -> ToolCallResult {
        let fail = |error: ToolError| ToolCallResult::failure(&call.id, &call.tool_name, error);

        let resolved = match self.registry.resolve(&call.tool_name) {
            Ok(resolved) => resolved,
            Err(e) => return fail(e.into()),
        };
        let provider = resolved.provider_name();
        let local = resolved.local_name();

        let Some(definition) = resolved.definition() else {
            return fail(ToolError::not_found(format!(
                "tool '{}' in provider '{}'",
                local, provider
            )));
        };
        if let Some(reason) = &call.argument_error {
            return fail(ToolError::invalid_argument(reason.clone()));
        }
        if let Err(message) = self.validator.validate(&call.arguments, definition) {
            return fail(ToolError::invalid_argument(message));
        }

        let key = CacheKey::for_call(&call.tool_name, &call.arguments);
        match self.cache.get(&key) {
            Ok(Some(value)) => {
                debug!(tool = %call.tool_name, "Cache hit");
                return ToolCallResult::success(&call.id, &call.tool_name, value).from_cache();
            }
            Ok(None) => trace!(tool = %call.tool_name, "Cache miss"),
            Err(e) => warn!(tool = %call.tool_name, error = %e, "Cache lookup failed, treating as miss"),
        }

        let acquire = self.limiter.acquire(provider);
        match deadline {
            Some(at) => {
                if tokio::time::timeout_at(at, acquire).await.is_err() {
                    return fail(ToolError::rate_limit_timeout(provider));
                }
            }
            None => {
                acquire.await;
            }
        }

        let tool_deadline = Instant::now() + self.config.tool_timeout;
        let bound = deadline.map_or(tool_deadline, |at| at.min(tool_deadline));
        let execution = resolved.provider().execute(local, &call.arguments);

        match tokio::time::timeout_at(bound, execution).await {
            Err(_) => fail(ToolError::timeout(format!(
                "{} did not finish in time",
                call.tool_name
            ))),
            Ok(Err(error)) => fail(error),
            Ok(Ok(value)) => {
                if let Err(e) = self.cache.set(key, value.clone()) {
                    warn!(tool = %call.tool_name, error = %e, "Failed to cache tool result");
                }
                ToolCallResult::success(&call.id, &call.tool_name, value)
            }
        }
    }
}

/// One conversation driven by a shared [`DispatchEngine`].
pub struct ChatSession {
    engine: Arc<DispatchEngine>,
    state: Mutex<ConversationState>,
}

impl ChatSession {
    pub fn new(engine: Arc<DispatchEngine>) -> Self {
        let state = ConversationState::new(engine.config.window_size);
        Self {
            engine,
            state: Mutex::new(state),
        }
    }

    /// Send a user message and return the final assistant text.
    pub async fn chat(&self, message: &str) -> Result<String, ChatError> {
        self.chat_with_options(message, ChatOptions::default())
            .await
            .map(|reply| reply.text)
    }

    /// Like [`chat`](Self::chat), bounded by `deadline` from now.
    pub async fn chat_with_deadline(
        &self,
        message: &str,
        deadline: Duration,
    ) -> Result<String, ChatError> {
        self.chat_with_options(message, ChatOptions::default().with_deadline(deadline))
            .await
            .map(|reply| reply.text)
    }

    /// Run one chat turn and return the full reply.
    pub async fn chat_with_options(
        &self,
        message: &str,
        options: ChatOptions,
    ) -> Result<ChatReply, ChatError> {
        let engine = &self.engine;
        let deadline = options
            .deadline
            .or(engine.config.chat_deadline)
            .map(|d| Instant::now() + d);

        let mut state = self.state.lock().await;
        info!("Chat turn: {}", truncate_str(message, 100));
        engine.conversation_logger.log(ConversationEvent::new(
            EventKind::ChatStarted,
            serde_json::json!({ "message": message }),
        ));

        let result = Self::run_turn(engine, &mut state, message, deadline).await;
        match &result {
            Ok(reply) => engine.conversation_logger.log(ConversationEvent::new(
                EventKind::ChatCompleted,
                serde_json::json!({
                    "text": reply.text,
                    "tool_calls": reply.tool_results.len(),
                }),
            )),
            Err(e) => {
                warn!(error = %e, "Chat turn failed");
                engine.conversation_logger.log(ConversationEvent::new(
                    EventKind::ChatFailed,
                    serde_json::json!({ "error": e.to_string() }),
                ));
            }
        }
        result
    }

    async fn run_turn(
        engine: &DispatchEngine,
        state: &mut ConversationState,
        message: &str,
        deadline: Option<Instant>,
    ) -> Result<ChatReply, ChatError> {
        let mut phases = vec![DispatchPhase::AwaitingFirstCompletion];
        state.append(ConversationEntry::user(message));

        let request = CompletionRequest::new(engine.dispatch_prompt(), state.window().to_vec())
            .with_tools(engine.registry.catalog());
        let response = engine
            .complete(&request, DispatchPhase::AwaitingFirstCompletion, deadline)
            .await?;
        if response.is_empty() {
            return Err(CompletionError::EmptyResponse.into());
        }

        let calls = response.tool_calls();
        let text = response.text_content();
        if calls.is_empty() {
            state.append(ConversationEntry::assistant(text.as_str()));
            phases.push(DispatchPhase::Done);
            debug!(?phases, "Answered without tools");
            return Ok(ChatReply {
                text,
                tool_results: Vec::new(),
                phases,
            });
        }

        state.append(ConversationEntry::assistant_with_tool_calls(text, calls.clone()));
        phases.push(DispatchPhase::ExecutingTools);
        debug!(phase = %DispatchPhase::ExecutingTools, calls = calls.len(), "Executing tool calls");

        let tool_results = engine.execute_calls(&calls, deadline).await;
        for result in &tool_results {
            state.append(ConversationEntry::tool(&result.call_id, result.to_content()));
        }

        phases.push(DispatchPhase::AwaitingFinalCompletion);
        // A deadline spent by the tools phase no longer bounds synthesis,
        // so timed-out tools still get explained to the user.
        let synthesis_deadline = deadline.filter(|at| *at > Instant::now());
        let request = CompletionRequest::new(
            PromptTemplate::synthesis_system(),
            state.window().to_vec(),
        );
        let response = engine
            .complete(&request, DispatchPhase::AwaitingFinalCompletion, synthesis_deadline)
            .await?;
        if response.has_tool_calls() {
            warn!("Ignoring tool calls requested during synthesis");
        }

        let text = response.text_content();
        if text.trim().is_empty() {
            return Err(CompletionError::EmptyResponse.into());
        }

        state.append(ConversationEntry::assistant(text.as_str()));
        phases.push(DispatchPhase::Done);
        info!(
            tool_calls = tool_results.len(),
            failed = tool_results.iter().filter(|r| !r.is_success()).count(),
            "Chat turn completed"
        );

        Ok(ChatReply {
            text,
            tool_results,
            phases,
        })
    }

    /// Drop every non-system entry.
    pub async fn reset_conversation(&self) {
        self.state.lock().await.reset();
        debug!("Conversation reset");
    }

    pub fn list_providers(&self) -> Vec<String> {
        self.engine
            .registry
            .provider_names()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Local tool names of `provider`, `None` if it is not registered.
    pub fn list_tools(&self, provider: &str) -> Option<Vec<String>> {
        self.engine
            .registry
            .tool_names(provider)
            .map(|names| names.into_iter().map(String::from).collect())
    }

    pub async fn summary(&self) -> ConversationSummary {
        let state = self.state.lock().await;
        ConversationSummary {
            message_count: state.len(),
            tool_call_count: state.tool_call_count(),
            providers: self.list_providers(),
            model: self.engine.config.model.clone(),
        }
    }

    /// Copy of the current conversation window.
    pub async fn window(&self) -> Vec<ConversationEntry> {
        self.state.lock().await.window().to_vec()
    }
}
