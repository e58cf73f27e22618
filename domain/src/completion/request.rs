//! Completion request types

use serde::{Deserialize, Serialize};

use crate::conversation::entities::ConversationEntry;
use crate::tool::registry::CatalogEntry;

/// Whether the completion service may request tool calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model decides whether to call tools
    Auto,
    /// The model must answer with text only
    None,
}

/// Everything the completion service needs for one completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Instruction sent ahead of the conversation window
    pub system_prompt: String,
    /// Conversation window, oldest first
    pub messages: Vec<ConversationEntry>,
    /// Tool catalog the model may call from
    pub tools: Vec<CatalogEntry>,
    pub tool_choice: ToolChoice,
}

impl CompletionRequest {
    pub fn new(system_prompt: impl Into<String>, messages: Vec<ConversationEntry>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages,
            tools: Vec::new(),
            tool_choice: ToolChoice::None,
        }
    }

    /// Offer a tool catalog with [`ToolChoice::Auto`].
    ///
    /// An empty catalog keeps [`ToolChoice::None`].
    pub fn with_tools(mut self, tools: Vec<CatalogEntry>) -> Self {
        self.tool_choice = if tools.is_empty() {
            ToolChoice::None
        } else {
            ToolChoice::Auto
        };
        self.tools = tools;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_choice_follows_catalog() {
        let request = CompletionRequest::new("sys", vec![ConversationEntry::user("hi")]);
        assert_eq!(request.tool_choice, ToolChoice::None);

        let request = request.with_tools(Vec::new());
        assert_eq!(request.tool_choice, ToolChoice::None);

        let entry = CatalogEntry {
            qualified_name: "builtin_echo".into(),
            provider: "builtin".into(),
            description: "[BUILTIN] Echo".into(),
            parameters: Vec::new(),
        };
        let request = request.with_tools(vec![entry]);
        assert_eq!(request.tool_choice, ToolChoice::Auto);
        assert_eq!(request.tools.len(), 1);
    }
}
