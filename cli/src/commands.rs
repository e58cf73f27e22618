//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for toolmesh
#[derive(Parser, Debug)]
#[command(name = "toolmesh")]
#[command(author, version, about = "Route chat completions through external tool providers")]
#[command(long_about = r#"
toolmesh sends your message to a completion service together with the tools
of every registered provider, runs the tool calls the model asks for, and
returns the model's final answer.

Each turn has two phases:
1. Dispatch: the model answers directly or requests tool calls
2. Synthesis: tool results are fed back and the model writes the answer

Configuration files are loaded from (in priority order):
1. TOOLMESH_* environment variables (e.g. TOOLMESH_COMPLETION__MODEL)
2. --config <path>     Explicit config file
3. ./toolmesh.toml     Project-level config
4. ~/.config/toolmesh/config.toml   Global config

Example:
  toolmesh chat "What is 17 * 23?"
  toolmesh chat --summary "What time is it?" "And in 90 minutes?"
  toolmesh tools builtin
  toolmesh --demo chat "List the slack channels"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Override the completion model
    #[arg(short, long, value_name = "MODEL", global = true)]
    pub model: Option<String>,

    /// Also register the simulated slack, google and github providers
    #[arg(long, global = true)]
    pub demo: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send messages in order within one conversation
    Chat {
        /// Messages to send
        #[arg(required = true, value_name = "MESSAGE")]
        messages: Vec<String>,

        /// Per-message deadline in seconds
        #[arg(long, value_name = "SECS")]
        deadline: Option<u64>,

        /// Print the conversation summary at the end
        #[arg(long)]
        summary: bool,

        /// Print each tool result after the answer
        #[arg(long)]
        show_tools: bool,
    },

    /// List registered providers
    Providers,

    /// List the tools of a provider
    Tools {
        /// Provider name
        provider: String,
    },

    /// Show configuration sources and the effective configuration
    Config,
}
