//! LLM provider integration
//!
//! The `LlmClient` trait is the seam every workflow talks through. The
//! concrete provider sits behind a `Throttled` decorator so pacing and token
//! accounting apply uniformly no matter which workflow makes the call.

mod client;
mod error;
mod openai;
mod throttle;
mod types;
mod usage;

pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use throttle::Throttled;
pub use types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, MessageContent, Role, StopReason, TokenUsage,
    ToolCall, ToolDefinition,
};
pub use usage::{UsageSummary, UsageTracker};

#[cfg(test)]
pub use client::mock::{MockLlmClient, text_response, tool_call_response};

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use crate::config::{LimiterConfig, LlmConfig};
use crate::limiter::RateLimiter;

/// Build the configured provider client wrapped in rate limiting and usage tracking
pub fn create_client(
    llm: &LlmConfig,
    limiter: &LimiterConfig,
    usage: Arc<UsageTracker>,
) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %llm.provider, model = %llm.model, "create_client: called");

    let inner: Arc<dyn LlmClient> = match llm.provider.as_str() {
        "openai" => Arc::new(OpenAIClient::from_config(llm)?),
        other => {
            return Err(LlmError::InvalidResponse(format!(
                "Unknown provider '{other}' (supported: openai)"
            )));
        }
    };

    let bucket = Arc::new(RateLimiter::new(limiter.requests_per_second, limiter.burst));
    Ok(Arc::new(Throttled::new(inner, bucket, usage)))
}

/// Parse a JSON value out of model output
///
/// Models occasionally wrap JSON in markdown fences despite instructions, so
/// strip those before handing the text to serde. As a last resort, parse the
/// slice between the outermost braces.
pub fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, serde_json::Error> {
    let trimmed = content.trim();

    let inner = if let Some(rest) = trimmed.strip_prefix("```json")
        && let Some(body) = rest.strip_suffix("```")
    {
        body.trim()
    } else if let Some(rest) = trimmed.strip_prefix("```")
        && let Some(body) = rest.strip_suffix("```")
    {
        body.trim()
    } else {
        trimmed
    };

    match serde_json::from_str(inner) {
        Ok(value) => Ok(value),
        Err(e) => {
            if let Some(start) = inner.find('{')
                && let Some(end) = inner.rfind('}')
                && start < end
            {
                debug!("parse_json: retrying with outermost braces");
                return serde_json::from_str(&inner[start..=end]);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
    }

    #[test]
    fn test_parse_json_plain() {
        let parsed: Sample = parse_json(r#"{"name": "Manali"}"#).unwrap();
        assert_eq!(parsed.name, "Manali");
    }

    #[test]
    fn test_parse_json_fenced() {
        let parsed: Sample = parse_json("```json\n{\"name\": \"Manali\"}\n```").unwrap();
        assert_eq!(parsed.name, "Manali");
    }

    #[test]
    fn test_parse_json_with_prose_around() {
        let parsed: Sample = parse_json("Here you go: {\"name\": \"Manali\"} hope that helps").unwrap();
        assert_eq!(parsed.name, "Manali");
    }

    #[test]
    fn test_parse_json_garbage() {
        let result: Result<Sample, _> = parse_json("no json here");
        assert!(result.is_err());
    }
}
