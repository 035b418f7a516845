//! Tool system for agent workflows
//!
//! Tools give the model hands: web search, page fetching, weather and place
//! lookups, and the Booking stay APIs. The [`ToolExecutor`] owns the registry
//! and runs calls under a timeout; [`ToolClassifier`] sorts the registry into
//! capability buckets so each workflow only sees the tools it should use.

mod classify;
mod executor;
mod traits;

pub mod builtin;

pub use classify::{Capability, CapabilityMap, ToolClassifier};
pub use executor::ToolExecutor;
pub use traits::{Tool, ToolResult};
