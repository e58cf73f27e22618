//! Command provider - config-defined shell commands as tools.
//!
//! Each `[providers.<name>]` section becomes one [`CommandProvider`]. A tool
//! wraps a shell command template with `{param_name}` placeholders.
//!
//! # Security
//!
//! Every substituted value is shell-escaped: single-quote wrapping on Unix,
//! double-quote wrapping with character escaping on Windows. Substitution is
//! a single left-to-right pass, so braces inside argument values are never
//! interpreted as placeholders.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use toolmesh_domain::{Arguments, CapabilityProvider, ToolDefinition, ToolError};
use tracing::debug;

use crate::config::FileCommandProviderConfig;

/// Maximum output size kept in memory per stream (1 MiB)
const MAX_OUTPUT_SIZE: u64 = 1024 * 1024;

/// Bounded capture of one output stream
#[derive(Debug, Default)]
struct Captured {
    kept: Vec<u8>,
    dropped: u64,
}

impl Captured {
    /// Keep the first `MAX_OUTPUT_SIZE` bytes. The rest is drained and
    /// counted so the child never blocks on a full pipe.
    async fn read<R: AsyncRead + Unpin>(reader: Option<R>) -> std::io::Result<Self> {
        let Some(mut reader) = reader else {
            return Ok(Self::default());
        };
        let mut kept = Vec::new();
        (&mut reader).take(MAX_OUTPUT_SIZE).read_to_end(&mut kept).await?;
        let dropped = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
        Ok(Self { kept, dropped })
    }

    fn render(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.kept).into_owned();
        if self.dropped > 0 {
            text.push_str(&format!("\n[truncated {} bytes]", self.dropped));
        }
        text
    }
}

/// Provider whose tools run shell command templates.
#[derive(Debug, Clone)]
pub struct CommandProvider {
    name: String,
    description: String,
    tools: Vec<ToolDefinition>,
    templates: HashMap<String, String>,
    working_dir: Option<PathBuf>,
}

impl CommandProvider {
    /// Build a provider from its `[providers.<name>]` section.
    pub fn from_config(name: impl Into<String>, config: &FileCommandProviderConfig) -> Self {
        let mut tools = Vec::with_capacity(config.tools.len());
        let mut templates = HashMap::with_capacity(config.tools.len());
        for (tool_name, tool) in &config.tools {
            tools.push(tool.to_definition(tool_name));
            templates.insert(tool_name.clone(), tool.command.clone());
        }

        Self {
            name: name.into(),
            description: config.description.clone(),
            tools,
            templates,
            working_dir: None,
        }
    }

    /// Run commands from `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    async fn run(&self, command_line: &str) -> Result<Value, ToolError> {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command_line]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command_line]);
            c
        };
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        // A timed-out call drops this future; the child goes with it.
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let failed = |e: std::io::Error| {
            ToolError::execution_failed(format!("Failed to execute command: {}", e))
        };
        let mut child = cmd.spawn().map_err(failed)?;
        let (stdout, stderr, status) = tokio::try_join!(
            Captured::read(child.stdout.take()),
            Captured::read(child.stderr.take()),
            child.wait(),
        )
        .map_err(failed)?;

        let mut text = stdout.render();
        let stderr = stderr.render();
        if !stderr.trim().is_empty() {
            if !text.is_empty() {
                text.push_str("\n--- stderr ---\n");
            }
            text.push_str(&stderr);
        }

        if status.success() {
            if text.is_empty() {
                text = "Command completed successfully (no output)".to_string();
            }
            Ok(Value::String(text))
        } else {
            let code = status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            let error = ToolError::execution_failed(format!("Command exited with status {}", code));
            Err(if text.is_empty() {
                error
            } else {
                error.with_details(text)
            })
        }
    }
}

#[async_trait]
impl CapabilityProvider for CommandProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    async fn execute(&self, local_name: &str, arguments: &Arguments) -> Result<Value, ToolError> {
        let template = self
            .templates
            .get(local_name)
            .ok_or_else(|| ToolError::not_found(format!("tool '{}'", local_name)))?;

        let command_line = build_command(template, arguments);
        debug!(provider = %self.name, tool = local_name, command = %command_line, "Running command tool");
        self.run(&command_line).await
    }
}

/// Substitute `{param_name}` placeholders with shell-escaped argument values.
///
/// Placeholders without a matching argument (optional parameters) are
/// dropped. Braces that do not form a placeholder are kept verbatim.
fn build_command(template: &str, arguments: &Arguments) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find('}') else {
            result.push_str(&rest[open..]);
            return result;
        };

        let name = &after[..close];
        let is_placeholder =
            !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
        if is_placeholder {
            if let Some(value) = arguments.get(name) {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                result.push_str(&shell_escape(&text));
            }
        } else {
            result.push('{');
            result.push_str(name);
            result.push('}');
        }
        rest = &after[close + 1..];
    }

    result.push_str(rest);
    result
}

/// Escape a string for safe shell substitution.
fn shell_escape(s: &str) -> String {
    if !s.is_empty()
        && s.chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
    {
        return s.to_string();
    }

    if cfg!(target_os = "windows") {
        shell_escape_windows(s)
    } else {
        shell_escape_unix(s)
    }
}

/// Unix: wrap in single quotes, close-escape-reopen around internal quotes.
fn shell_escape_unix(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Windows cmd.exe: wrap in double quotes, escape `"`, `%` and `!`.
fn shell_escape_windows(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 4);
    escaped.push('"');
    for ch in s.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '%' => escaped.push_str("%%"),
            '!' => escaped.push_str("^!"),
            _ => escaped.push(ch),
        }
    }
    escaped.push('"');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;
    use serde_json::json;
    use toolmesh_domain::tool::value_objects::EXECUTION_FAILED;

    fn args(pairs: &[(&str, Value)]) -> Arguments {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn provider(toml_str: &str) -> CommandProvider {
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let (name, section) = config.providers.iter().next().unwrap();
        CommandProvider::from_config(name, section)
    }

    #[test]
    fn test_build_command_simple() {
        let cmd = build_command("wc -l {path}", &args(&[("path", json!("src/main.rs"))]));
        assert_eq!(cmd, "wc -l src/main.rs");
    }

    #[test]
    fn test_build_command_escaping() {
        let cmd = build_command(
            "echo {message}",
            &args(&[("message", json!("it's $(rm -rf /)"))]),
        );
        if cfg!(target_os = "windows") {
            assert_eq!(cmd, "echo \"it's $(rm -rf /)\"");
        } else {
            assert_eq!(cmd, "echo 'it'\\''s $(rm -rf /)'");
        }
    }

    #[test]
    fn test_build_command_values_are_not_rescanned() {
        let cmd = build_command(
            "printf {a} {b}",
            &args(&[("a", json!("{b}")), ("b", json!("x"))]),
        );
        if !cfg!(target_os = "windows") {
            assert_eq!(cmd, "printf '{b}' x");
        }
    }

    #[test]
    fn test_build_command_missing_optional_and_literal_braces() {
        let cmd = build_command("jq {filter} '{.a}' {file", &args(&[]));
        assert_eq!(cmd, "jq  '{.a}' {file");
    }

    #[test]
    fn test_build_command_non_string_values() {
        let cmd = build_command("head -n {lines}", &args(&[("lines", json!(20))]));
        assert_eq!(cmd, "head -n 20");
    }

    #[test]
    fn test_shell_escape_safe_string() {
        assert_eq!(shell_escape("hello-world_1.txt"), "hello-world_1.txt");
    }

    #[test]
    fn test_shell_escape_windows() {
        assert_eq!(shell_escape_windows("say \"hi\" 100%!"), "\"say \\\"hi\\\" 100%%^!\"");
    }

    #[test]
    fn test_from_config() {
        let provider = provider(
            r#"
[providers.shell]
description = "Local shell"

[providers.shell.tools.greet]
description = "Greet someone"
command = "echo Hello {name}"

[providers.shell.tools.greet.parameters.name]
description = "Who to greet"
"#,
        );

        assert_eq!(provider.name(), "shell");
        assert_eq!(provider.description(), "Local shell");
        assert_eq!(provider.tools().len(), 1);
        let def = provider.tool("greet").unwrap();
        assert!(def.parameter("name").unwrap().required);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_echo() {
        let provider = provider(
            r#"
[providers.shell.tools.greet]
description = "Greet someone"
command = "echo Hello {name}"

[providers.shell.tools.greet.parameters.name]
description = "Who to greet"
"#,
        );

        let output = provider
            .execute("greet", &args(&[("name", json!("world; ls"))]))
            .await
            .unwrap();
        assert_eq!(output, json!("Hello world; ls\n"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_non_zero_exit() {
        let provider = provider(
            r#"
[providers.shell.tools.fail]
description = "Fails"
command = "echo boom >&2; exit 3"
"#,
        );

        let err = provider.execute("fail", &args(&[])).await.unwrap_err();
        assert_eq!(err.code, EXECUTION_FAILED);
        assert!(err.message.contains('3'));
        assert_eq!(err.details.as_deref(), Some("boom\n"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_no_output() {
        let provider = provider(
            r#"
[providers.shell.tools.noop]
description = "Does nothing"
command = "true"
"#,
        );

        let output = provider.execute("noop", &args(&[])).await.unwrap();
        assert_eq!(output, json!("Command completed successfully (no output)"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_caps_captured_output() {
        let provider = provider(
            r#"
[providers.shell.tools.flood]
description = "Writes more than the cap"
command = "head -c 1100000 /dev/zero | tr '\\0' a"
"#,
        );

        let output = provider.execute("flood", &args(&[])).await.unwrap();
        let text = output.as_str().unwrap();
        assert!(text.ends_with("\n[truncated 51424 bytes]"));
        assert_eq!(text.len(), MAX_OUTPUT_SIZE as usize + "\n[truncated 51424 bytes]".len());
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let provider = provider(
            r#"
[providers.shell.tools.noop]
description = "Does nothing"
command = "true"
"#,
        );

        let err = provider.execute("missing", &args(&[])).await.unwrap_err();
        assert!(err.message.contains("missing"));
    }
}
