//! Interactive chat session
//!
//! Thin readline loop over the supervisor. Every line the user types is one
//! turn; the session id stays fixed so suspended gathering runs resume
//! across turns, and `/new` swaps in a fresh id when the user wants to start
//! over.

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::sync::Arc;
use tracing::debug;

use crate::llm::UsageTracker;
use crate::session::new_session_id;
use crate::workflow::{Supervisor, TurnOutcome};

/// Interactive chat session
pub struct ReplSession {
    supervisor: Arc<Supervisor>,
    usage: Arc<UsageTracker>,
    session_id: String,
}

impl ReplSession {
    pub fn new(supervisor: Arc<Supervisor>, usage: Arc<UsageTracker>, session_id: String) -> Self {
        debug!(%session_id, "ReplSession::new: called");
        Self { supervisor, usage, session_id }
    }

    /// Run the chat main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        // Create readline editor for proper line editing
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input) {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.process_user_input(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D - exit
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        let summary = self.usage.summary();
        debug!(
            calls = summary.total_calls,
            total_tokens = summary.total_tokens,
            "ReplSession::run: exiting"
        );
        println!("Goodbye!");
        Ok(())
    }

    /// Print welcome message
    fn print_welcome(&self) {
        println!();
        println!("{}", "TripDaemon Travel Assistant".bright_cyan().bold());
        println!("Session: {}", self.session_id.as_str().dimmed());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/new" => {
                self.session_id = new_session_id();
                println!("{} {}", "Started new session:".dimmed(), self.session_id);
                SlashResult::Continue
            }
            "/session" => {
                println!("{}", self.session_id);
                SlashResult::Continue
            }
            "/usage" => {
                self.print_usage();
                SlashResult::Continue
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    /// Print help message
    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:12} Show this help", "/help".yellow());
        println!("  {:12} Exit the chat", "/quit".yellow());
        println!("  {:12} Start a new session", "/new".yellow());
        println!("  {:12} Show the current session id", "/session".yellow());
        println!("  {:12} Show token usage so far", "/usage".yellow());
        println!();
        println!("Ask for a place to stay, or for ideas on where to travel.");
        println!();
    }

    /// Print accumulated token usage
    fn print_usage(&self) {
        let summary = self.usage.summary();
        println!();
        println!("{}", "Token Usage:".bright_cyan());
        println!("  Calls:             {}", summary.total_calls);
        println!("  Prompt tokens:     {}", summary.prompt_tokens);
        println!("  Completion tokens: {}", summary.completion_tokens);
        println!("  Total tokens:      {}", summary.total_tokens);
        println!();
    }

    /// Run one turn through the supervisor and print its outcome. Turn
    /// errors are printed, not propagated, so a failed call never kills the
    /// session.
    async fn process_user_input(&mut self, input: &str) {
        debug!(session_id = %self.session_id, "ReplSession::process_user_input: called");
        println!();

        match self.supervisor.handle_turn(&self.session_id, input).await {
            Ok(TurnOutcome::AwaitingInput { prompt }) => {
                println!("{}", prompt);
            }
            Ok(TurnOutcome::Final { reply }) => {
                println!("{}", reply);
            }
            Err(e) => {
                println!("{} {:#}", "Error:".red(), e);
            }
        }

        println!();
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
