//! Console output formatting

use colored::Colorize;
use toolmesh_application::{ChatReply, ConversationSummary};
use toolmesh_domain::util::truncate_with_notice;
use toolmesh_domain::{CapabilityProvider, CatalogEntry, ToolCallResult};

/// Longest tool output shown with `--show-tools`
const MAX_TOOL_OUTPUT: usize = 500;

/// Formats chat replies and registry listings for the console
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format one chat turn
    pub fn format_reply(message: &str, reply: &ChatReply, show_tools: bool) -> String {
        let mut output = format!("{} {}\n", ">".cyan().bold(), message);

        if show_tools && !reply.tool_results.is_empty() {
            for result in &reply.tool_results {
                output.push_str(&Self::format_tool_result(result));
            }
        }

        output.push_str(&reply.text);
        output.push('\n');
        output
    }

    fn format_tool_result(result: &ToolCallResult) -> String {
        let cached = if result.metadata.cached { " (cached)" } else { "" };
        let duration = result
            .metadata
            .duration_ms
            .map(|ms| format!(" {}ms", ms))
            .unwrap_or_default();

        if result.is_success() {
            let content = result.to_content();
            format!(
                "  {} {}{}{}\n{}\n",
                "ok".green().bold(),
                result.tool_name,
                duration.dimmed(),
                cached.dimmed(),
                Self::indent(&truncate_with_notice(&content, MAX_TOOL_OUTPUT), "    ")
            )
        } else {
            format!(
                "  {} {}{}\n{}\n",
                "failed".red().bold(),
                result.tool_name,
                duration.dimmed(),
                Self::indent(&result.to_content(), "    ")
            )
        }
    }

    pub fn format_summary(summary: &ConversationSummary) -> String {
        format!(
            "\n{}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
            "Conversation summary".cyan().bold(),
            "model:".dimmed(),
            summary.model,
            "messages:".dimmed(),
            summary.message_count,
            "tool calls:".dimmed(),
            summary.tool_call_count,
            "providers:".dimmed(),
            summary.providers.join(", ")
        )
    }

    pub fn format_providers<'a>(
        providers: impl IntoIterator<Item = &'a std::sync::Arc<dyn CapabilityProvider>>,
    ) -> String {
        let mut output = String::new();
        for provider in providers {
            output.push_str(&format!(
                "{} ({} tools)",
                provider.name().bold(),
                provider.tools().len()
            ));
            if !provider.description().is_empty() {
                output.push_str(&format!(" - {}", provider.description()));
            }
            output.push('\n');
        }
        output
    }

    pub fn format_tools(entries: &[CatalogEntry]) -> String {
        let mut output = String::new();
        for entry in entries {
            output.push_str(&format!(
                "{}\n    {}\n",
                entry.qualified_name.bold(),
                entry.description
            ));
            for param in &entry.parameters {
                let required = if param.required { "required" } else { "optional" };
                output.push_str(&format!(
                    "    - {} ({}, {}): {}\n",
                    param.name, param.param_type, required, param.description
                ));
            }
        }
        output
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
