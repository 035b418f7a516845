//! TripDaemon - conversational travel planner
//!
//! TripDaemon turns a chat conversation into structured travel planning: it
//! classifies what the user is after, gathers the details each request
//! needs across as many turns as it takes, and hands the confirmed details
//! to the workflow that can act on them.
//!
//! # Core Concepts
//!
//! - **Checkpoint Everything**: A session suspends whenever the assistant
//!   asks the user a question; the checkpoint restores it, even across
//!   process restarts
//! - **Validate What Arrived**: Extracted details are checked field by
//!   field, so one bad answer never discards the good ones
//! - **Bucketed Tools**: Tools are classified into capability buckets once
//!   at startup, and each agent run sees only its bucket
//! - **Isolated Fan-out**: Research branches run concurrently and fail
//!   alone; a dead branch costs its contribution, not the pipeline
//!
//! # Modules
//!
//! - [`llm`] - LLM client trait, OpenAI implementation, rate limiting
//! - [`schema`] - Requirement schemas and partial validation
//! - [`workflow`] - Intent routing, gathering, and the planning workflows
//! - [`extract`] - Place-name extraction, deduplication, page fetching
//! - [`tools`] - Travel toolkit and capability classification
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod extract;
pub mod limiter;
pub mod llm;
pub mod prompts;
pub mod repl;
pub mod schema;
pub mod session;
pub mod tools;
pub mod workflow;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use extract::{CandidatePlace, DedupeConfig, PageFetcher, PlaceExtractor, filter_similar_phrases};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, UsageTracker};
pub use prompts::{PromptError, PromptLoader};
pub use schema::{
    FieldError, FieldErrorKind, RequirementSchema, RequirementState, ValidationOutcome, partial_validate,
};
pub use session::{ElicitationCheckpoint, SessionCheckpoint, SuspendPoint, new_session_id};
pub use tools::{Capability, CapabilityMap, Tool, ToolClassifier, ToolExecutor, ToolResult};
pub use workflow::{
    ElicitationWorkflow, Intent, IntentClassifier, RecommendationWorkflow, StaySearchWorkflow, Step,
    Supervisor, TurnOutcome, WorkflowError,
};
