//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for the workflows.
//!
//! Template loading chain:
//! 1. Configured override directory (`prompts.dir`)
//! 2. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{PromptError, PromptLoader};
