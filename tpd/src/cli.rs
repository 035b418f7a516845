//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// TripDaemon - conversational travel planner
#[derive(Parser)]
#[command(
    name = "tpd",
    about = "Conversational assistant for finding stays and travel destinations",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chat with the travel assistant (default)
    Chat {
        /// Session id to resume; a fresh session is started when omitted
        #[arg(short, long)]
        session: Option<String>,
    },

    /// List stored sessions
    Sessions,

    /// Show the details gathered for each kind of request
    Schemas,

    /// Show the effective configuration
    Config,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripdaemon")
        .join("logs")
        .join("tripdaemon.log");
    debug!(?path, "get_log_path: returning path");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["tpd"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_chat() {
        let cli = Cli::parse_from(["tpd", "chat"]);
        assert!(matches!(cli.command, Some(Command::Chat { session: None })));
    }

    #[test]
    fn test_cli_parse_chat_with_session() {
        let cli = Cli::parse_from(["tpd", "chat", "--session", "abc-123"]);
        if let Some(Command::Chat { session }) = cli.command {
            assert_eq!(session.as_deref(), Some("abc-123"));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_sessions() {
        let cli = Cli::parse_from(["tpd", "sessions"]);
        assert!(matches!(cli.command, Some(Command::Sessions)));
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["tpd", "-c", "/path/to/config.yml", "schemas"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
        assert!(matches!(cli.command, Some(Command::Schemas)));
    }

    #[test]
    fn test_cli_log_level_is_global() {
        let cli = Cli::parse_from(["tpd", "chat", "--log-level", "DEBUG"]);
        assert_eq!(cli.log_level.as_deref(), Some("DEBUG"));
    }
}
