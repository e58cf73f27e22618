//! OpenAI-compatible chat completions adapter.
//!
//! Works with any endpoint speaking the `/v1/chat/completions` wire format
//! with function tools (OpenAI, OpenRouter, Ollama, vLLM).
//!
//! The whole window travels in every request:
//!
//! ```text
//! CompletionRequest                     chat-completions body
//! ─────────────────                     ─────────────────────
//! system_prompt              ──────▶    messages[0] (role "system")
//! messages[..]               ──────▶    messages[1..]
//! tools (CatalogEntry)       ──────▶    tools[{type:"function", function:{..}}]
//! tool_choice                ──────▶    "auto" | "none" (omitted without tools)
//! ```

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use toolmesh_application::{CompletionError, CompletionService};
use toolmesh_domain::{
    Arguments, CatalogEntry, CompletionRequest, CompletionResponse, ContentBlock,
    ConversationEntry, Role, StopReason, ToolChoice,
};
use tracing::{debug, warn};

use crate::config::FileCompletionConfig;

/// Failure to construct the adapter
#[derive(Error, Debug)]
pub enum CompletionSetupError {
    #[error("API key environment variable '{0}' is not set")]
    MissingApiKey(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Completion service backed by an OpenAI-compatible HTTP endpoint.
pub struct OpenAiCompletionService {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenAiCompletionService {
    /// Build from the `[completion]` section, reading the API key from the
    /// configured environment variable.
    pub fn new(config: &FileCompletionConfig) -> Result<Self, CompletionSetupError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CompletionSetupError::MissingApiKey(config.api_key_env.clone()))?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(
        config: &FileCompletionConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, CompletionSetupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn build_body(&self, request: &CompletionRequest) -> ChatBody {
        let tools: Vec<WireTool> = request.tools.iter().map(WireTool::from_catalog).collect();
        let tool_choice = if tools.is_empty() {
            None
        } else {
            Some(match request.tool_choice {
                ToolChoice::Auto => "auto",
                ToolChoice::None => "none",
            })
        };

        ChatBody {
            model: self.model.clone(),
            messages: wire_messages(&request.system_prompt, &request.messages),
            tools,
            tool_choice,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionService {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let body = self.build_body(request);
        debug!(
            model = %self.model,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message.trim()
            )));
        }

        let reply: WireReply = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;
        parse_reply(reply)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatBody {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded argument object
    #[serde(default)]
    arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: Value,
}

impl WireTool {
    fn from_catalog(entry: &CatalogEntry) -> Self {
        Self {
            tool_type: "function",
            function: WireFunction {
                name: entry.qualified_name.clone(),
                description: entry.description.clone(),
                parameters: entry.parameters_schema(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireReply {
    #[serde(default)]
    choices: Vec<WireChoice>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireReplyMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

/// Map the window to wire messages, system prompt first.
///
/// A `tool` entry whose originating assistant call was evicted from the
/// window travels as a `user` message naming the call, since the API
/// rejects tool messages without a preceding `tool_calls` entry.
fn wire_messages(system_prompt: &str, entries: &[ConversationEntry]) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(entries.len() + 1);
    messages.push(WireMessage {
        role: Role::System.as_str(),
        content: Some(system_prompt.to_string()),
        tool_calls: Vec::new(),
        tool_call_id: None,
    });

    let mut open_calls: HashSet<&str> = HashSet::new();
    for entry in entries {
        match entry.role {
            Role::Assistant if entry.has_tool_calls() => {
                open_calls = entry.tool_calls.iter().map(|c| c.id.as_str()).collect();
                messages.push(WireMessage {
                    role: Role::Assistant.as_str(),
                    content: (!entry.content.is_empty()).then(|| entry.content.clone()),
                    tool_calls: entry
                        .tool_calls
                        .iter()
                        .map(|call| WireToolCall {
                            id: call.id.clone(),
                            call_type: function_type(),
                            function: WireFunctionCall {
                                name: call.tool_name.clone(),
                                arguments: Value::Object(
                                    call.arguments
                                        .iter()
                                        .map(|(k, v)| (k.clone(), v.clone()))
                                        .collect(),
                                )
                                .to_string(),
                            },
                        })
                        .collect(),
                    tool_call_id: None,
                });
            }
            Role::Tool => {
                let Some(id) = entry.tool_call_id.as_deref() else {
                    continue;
                };
                if !open_calls.contains(id) {
                    debug!(tool_call_id = id, "Sending tool result without its call as context");
                    messages.push(WireMessage {
                        role: Role::User.as_str(),
                        content: Some(format!("[tool result {}]\n{}", id, entry.content)),
                        tool_calls: Vec::new(),
                        tool_call_id: None,
                    });
                    continue;
                }
                messages.push(WireMessage {
                    role: Role::Tool.as_str(),
                    content: Some(entry.content.clone()),
                    tool_calls: Vec::new(),
                    tool_call_id: Some(id.to_string()),
                });
            }
            role => {
                open_calls.clear();
                messages.push(WireMessage {
                    role: role.as_str(),
                    content: Some(entry.content.clone()),
                    tool_calls: Vec::new(),
                    tool_call_id: None,
                });
            }
        }
    }

    messages
}

/// Decode a JSON-string argument object. The error is the reason shown to
/// the model as the call's `INVALID_ARGUMENT` result.
fn parse_arguments(raw: &str) -> Result<Arguments, String> {
    if raw.trim().is_empty() {
        return Ok(Arguments::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(other) => Err(format!("tool arguments must be a JSON object, got {}", other)),
        Err(e) => Err(format!("unparsable tool arguments: {}", e)),
    }
}

fn parse_stop_reason(reason: &str) -> StopReason {
    match reason {
        "stop" => StopReason::EndTurn,
        "tool_calls" | "function_call" => StopReason::ToolUse,
        "length" => StopReason::MaxTokens,
        other => StopReason::Other(other.to_string()),
    }
}

fn parse_reply(reply: WireReply) -> Result<CompletionResponse, CompletionError> {
    let Some(choice) = reply.choices.into_iter().next() else {
        return Err(CompletionError::MalformedResponse(
            "response has no choices".to_string(),
        ));
    };

    let mut content = Vec::new();
    if let Some(text) = choice.message.content
        && !text.is_empty()
    {
        content.push(ContentBlock::Text(text));
    }
    for call in choice.message.tool_calls {
        if call.call_type != "function" {
            warn!(call_type = %call.call_type, "Ignoring non-function tool call");
            continue;
        }
        match parse_arguments(&call.function.arguments) {
            Ok(input) => content.push(ContentBlock::ToolUse {
                id: call.id,
                name: call.function.name,
                input,
            }),
            Err(reason) => {
                warn!(call_id = %call.id, tool = %call.function.name, %reason, "Tool call arguments rejected");
                content.push(ContentBlock::MalformedToolUse {
                    id: call.id,
                    name: call.function.name,
                    reason,
                });
            }
        }
    }

    Ok(CompletionResponse {
        content,
        stop_reason: choice.finish_reason.as_deref().map(parse_stop_reason),
        model: reply.model,
    })
}
