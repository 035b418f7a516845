//! Conversation workflows
//!
//! The supervisor routes each turn by intent. Stay search and destination
//! recommendation both start with the elicitation state machine, which
//! gathers requirements across turns and suspends at the human boundary;
//! once the requirements validate, the stay path runs a booking agent and
//! the destination path runs the search/extract/investigate pipeline.

mod agent;
mod elicitation;
mod intent;
mod recommendation;
mod stay;
mod supervisor;

pub use agent::AgentRunner;
pub use elicitation::{ElicitationWorkflow, Step};
pub use intent::{Intent, IntentClassifier};
pub use recommendation::RecommendationWorkflow;
pub use stay::StaySearchWorkflow;
pub use supervisor::{Supervisor, TurnOutcome};

use thiserror::Error;

use crate::llm::LlmError;
use crate::prompts::PromptError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("prompt rendering failed: {0}")]
    Prompt(#[from] PromptError),

    #[error("classification returned unknown label '{label}'")]
    ClassificationMismatch { label: String },

    #[error("model returned no content")]
    NoContent,

    #[error("malformed structured response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("no requirement schema for intent '{intent}'")]
    UnsupportedIntent { intent: String },
}
