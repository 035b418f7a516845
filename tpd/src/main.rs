//! TripDaemon - conversational travel planner
//!
//! CLI entry point for the chat assistant and session management commands.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use sessionstore::SessionStore;
use tracing::{debug, info};

use tripdaemon::cli::{Cli, Command, get_log_path};
use tripdaemon::config::Config;
use tripdaemon::llm::{UsageTracker, create_client};
use tripdaemon::prompts::PromptLoader;
use tripdaemon::repl::ReplSession;
use tripdaemon::session::new_session_id;
use tripdaemon::tools::{ToolClassifier, ToolExecutor};
use tripdaemon::workflow::{Intent, Supervisor};

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = if let Some(s) = cli_log_level {
        match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        }
    } else {
        tracing::Level::INFO
    };

    // Logs go to a file, not the terminal the chat runs in
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("TripDaemon loaded config: model={}", config.llm.model);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Chat { session }) => {
            debug!(?session, "main: matched Chat command");
            cmd_chat(&config, session).await
        }
        Some(Command::Sessions) => {
            debug!("main: matched Sessions command");
            cmd_sessions(&config)
        }
        Some(Command::Schemas) => {
            debug!("main: matched Schemas command");
            cmd_schemas()
        }
        Some(Command::Config) => {
            debug!("main: matched Config command");
            cmd_config(&config)
        }
        None => {
            debug!("main: no command specified, starting chat");
            cmd_chat(&config, None).await
        }
    }
}

/// Start (or resume) an interactive chat session
async fn cmd_chat(config: &Config, session: Option<String>) -> Result<()> {
    debug!(?session, "cmd_chat: called");
    config.validate()?;

    let prompts = Arc::new(PromptLoader::new(config.prompts.dir.as_deref()));
    let usage = Arc::new(UsageTracker::new());
    let llm = create_client(&config.llm, &config.limiter, usage.clone())
        .context("Failed to create LLM client")?;
    debug!("cmd_chat: LLM client created");

    let executor = Arc::new(ToolExecutor::standard(&config.tools));

    // One classification pass up front sorts the toolkit into capability
    // buckets; the workflows never see tools outside their bucket.
    let capabilities = ToolClassifier::new(llm.clone(), prompts.clone())
        .classify(&executor)
        .await
        .context("Failed to classify tools")?;
    if capabilities.is_empty() {
        info!("Tool classification produced no buckets; agents will run without tools");
    }
    debug!("cmd_chat: tools classified");

    let store = Arc::new(
        SessionStore::open(&config.store.dir).context("Failed to open session store")?,
    );

    let supervisor = Arc::new(Supervisor::new(
        config,
        llm,
        prompts,
        store,
        executor,
        Arc::new(capabilities),
    ));

    let session_id = session.unwrap_or_else(new_session_id);
    debug!(%session_id, "cmd_chat: starting REPL");
    ReplSession::new(supervisor, usage, session_id).run().await
}

/// List stored sessions, most recently used first
fn cmd_sessions(config: &Config) -> Result<()> {
    debug!("cmd_sessions: called");
    let store = SessionStore::open(&config.store.dir).context("Failed to open session store")?;
    let entries = store.list()?;

    if entries.is_empty() {
        debug!("cmd_sessions: no sessions found");
        println!("No stored sessions in {}", config.store.dir);
        return Ok(());
    }

    println!("{:<40} {:>10} {:<20}", "SESSION", "BYTES", "LAST USED");
    println!("{}", "-".repeat(72));
    for entry in entries {
        let last_used = chrono::DateTime::from_timestamp_millis(entry.modified_at)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("{:<40} {:>10} {:<20}", entry.session_id, entry.bytes, last_used);
    }

    Ok(())
}

/// Show the requirement fields gathered for each kind of request
fn cmd_schemas() -> Result<()> {
    debug!("cmd_schemas: called");
    for intent in Intent::ALL {
        let Some(schema) = intent.schema() else {
            continue;
        };
        println!("{} ({} v{})", intent.label(), schema.name, schema.version);
        println!("{}", schema.description_lines());
        println!();
    }

    Ok(())
}

/// Show the effective configuration
fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    println!("{}", yaml);
    Ok(())
}
