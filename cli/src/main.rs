//! CLI entrypoint for toolmesh
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;
mod output;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use commands::{Cli, Command};
use output::ConsoleFormatter;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use toolmesh_application::{
    CacheStore, ChatOptions, ConversationLogger, DispatchEngine, ResponseCache,
};
use toolmesh_domain::CapabilityRegistry;
use toolmesh_infrastructure::{
    BuiltinProvider, CommandProvider, ConfigLoader, FileConfig, JsonCacheStore,
    JsonlConversationLogger, OpenAiCompletionService, SimulatedProvider,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
    }
    .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

    if let Some(model) = &cli.model {
        config.completion.model = model.clone();
    }
    config.validate().context("Invalid configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing(cli.verbose, config.logging.dir.as_deref())?;
    info!("Starting toolmesh");

    let demo = cli.demo;
    match cli.command {
        Command::Chat {
            messages,
            deadline,
            summary,
            show_tools,
        } => {
            let options = ChatOptions {
                deadline: deadline.map(Duration::from_secs),
            };
            run_chat(&config, demo, &messages, options, summary, show_tools).await
        }
        Command::Providers => {
            let registry = build_registry(&config, demo)?;
            print!("{}", ConsoleFormatter::format_providers(registry.providers()));
            Ok(())
        }
        Command::Tools { provider } => {
            let registry = build_registry(&config, demo)?;
            if registry.provider(&provider).is_none() {
                return Err(anyhow!(
                    "Unknown provider '{}' (registered: {})",
                    provider,
                    registry.provider_names().join(", ")
                ));
            }
            let entries: Vec<_> = registry
                .catalog()
                .into_iter()
                .filter(|entry| entry.provider == provider)
                .collect();
            print!("{}", ConsoleFormatter::format_tools(&entries));
            Ok(())
        }
        Command::Config => {
            println!("Configuration sources (highest to lowest priority):");
            println!("  [       ] Env:      TOOLMESH_* variables");
            if cli.no_config {
                println!("  [       ] Default:  built-in defaults (--no-config)");
            } else {
                for source in ConfigLoader::config_sources(cli.config.as_deref()) {
                    println!("  {}", source);
                }
            }
            println!();
            print!(
                "{}",
                toml::to_string_pretty(&config).context("Failed to render configuration")?
            );
            Ok(())
        }
    }
}

/// Console logging filtered by verbosity (RUST_LOG wins), plus a daily
/// rolling file when `[logging] dir` is set.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let Some(dir) = log_dir else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::daily(dir, "toolmesh.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Ok(Some(guard))
}

/// Register the built-in provider, the simulated ones with `--demo`, and
/// every `[providers.<name>]` section.
fn build_registry(config: &FileConfig, demo: bool) -> Result<CapabilityRegistry> {
    let mut registry = CapabilityRegistry::new();
    registry.register(Arc::new(BuiltinProvider::new()))?;
    if demo {
        for provider in SimulatedProvider::all() {
            registry.register(Arc::new(provider))?;
        }
    }
    for (name, section) in &config.providers {
        registry
            .register(Arc::new(CommandProvider::from_config(name, section)))
            .with_context(|| format!("Failed to register provider '{}'", name))?;
    }
    Ok(registry)
}

async fn run_chat(
    config: &FileConfig,
    demo: bool,
    messages: &[String],
    options: ChatOptions,
    summary: bool,
    show_tools: bool,
) -> Result<()> {
    let dispatch_config = config.dispatch_config();

    // === Dependency Injection ===
    let completion = Arc::new(OpenAiCompletionService::new(&config.completion)?);
    let registry = Arc::new(build_registry(config, demo)?);

    let cache = Arc::new(ResponseCache::new(dispatch_config.cache_ttl));
    let store = config.cache.path.as_ref().map(JsonCacheStore::new);
    if let Some(store) = &store {
        restore_cache(&cache, store);
    }

    let mut engine = DispatchEngine::new(completion, registry, dispatch_config)
        .with_cache(Arc::clone(&cache));
    if let Some(path) = &config.logging.conversation_log {
        let logger = JsonlConversationLogger::open(path).with_context(|| {
            format!("Failed to open conversation log {}", path.display())
        })?;
        engine = engine.with_conversation_logger(Arc::new(logger) as Arc<dyn ConversationLogger>);
    }
    let engine = Arc::new(engine);
    let session = engine.new_session();

    let mut outcome = Ok(());
    for message in messages {
        match session.chat_with_options(message, options.clone()).await {
            Ok(reply) => print!("{}", ConsoleFormatter::format_reply(message, &reply, show_tools)),
            Err(e) => {
                outcome = Err(anyhow!(e).context("Chat failed"));
                break;
            }
        }
    }

    if summary {
        print!("{}", ConsoleFormatter::format_summary(&session.summary().await));
    }

    if let Some(store) = &store {
        save_cache(&cache, store);
    }

    outcome
}

fn restore_cache(cache: &ResponseCache, store: &JsonCacheStore) {
    match store.load() {
        Ok(Some(snapshot)) => match cache.restore(snapshot) {
            Ok(restored) => info!(restored, path = %store.path().display(), "Restored response cache"),
            Err(e) => warn!("Ignoring cache snapshot: {}", e),
        },
        Ok(None) => {}
        Err(e) => warn!("Failed to load cache snapshot: {}", e),
    }
}

fn save_cache(cache: &ResponseCache, store: &JsonCacheStore) {
    if let Err(e) = cache.snapshot().and_then(|snapshot| store.save(&snapshot)) {
        warn!("Failed to save cache snapshot: {}", e);
    }
}
