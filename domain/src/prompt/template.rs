//! Prompt templates for the two-phase completion protocol

/// Templates for the system instruction of each completion
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the first completion, where the model may request tools.
    ///
    /// `services` lists `(provider, description)` pairs in registration order.
    pub fn dispatch_system(services: &[(&str, &str)]) -> String {
        let mut prompt = String::from(
            "You are a helpful AI assistant with access to external services through tools.\n",
        );

        if !services.is_empty() {
            prompt.push_str("\nAvailable services:\n");
            for (name, description) in services {
                if description.is_empty() {
                    prompt.push_str(&format!("- {}\n", name));
                } else {
                    prompt.push_str(&format!("- {}: {}\n", name, description));
                }
            }
        }

        prompt.push_str(
            r#"
When a user asks for something that requires an external service, call the appropriate tool.
Always explain what you are doing and provide helpful responses.
If a tool call fails, try an alternative approach or explain the limitation."#,
        );
        prompt
    }

    /// System prompt for the synthesis completion, after tools have run.
    pub fn synthesis_system() -> &'static str {
        r#"You are a helpful AI assistant. Use the tool results in the conversation to provide a comprehensive response to the user.
If any tools failed, explain what happened and suggest alternatives."#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_system_lists_services() {
        let prompt = PromptTemplate::dispatch_system(&[
            ("slack", "Send messages, manage channels"),
            ("builtin", ""),
        ]);
        assert!(prompt.contains("- slack: Send messages, manage channels\n"));
        assert!(prompt.contains("- builtin\n"));
        assert!(prompt.contains("If a tool call fails"));
    }

    #[test]
    fn test_dispatch_system_without_services() {
        let prompt = PromptTemplate::dispatch_system(&[]);
        assert!(!prompt.contains("Available services"));
    }

    #[test]
    fn test_synthesis_system_mentions_failures() {
        assert!(PromptTemplate::synthesis_system().contains("If any tools failed"));
    }
}
