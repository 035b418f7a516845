//! Candidate-place extraction from search-result text
//!
//! Each search result is mined for place names through [`PlaceExtractor`],
//! then the combined candidates are collapsed by [`filter_similar_phrases`]
//! before investigation fans out.

mod dedupe;
mod fetch;

pub use dedupe::{DedupeConfig, filter_similar_phrases, token_sort_similarity};
pub use fetch::{FetchError, PageFetcher};

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::llm::{CompletionRequest, LlmClient, LlmError, Message, parse_json};
use crate::prompts::{PromptError, PromptLoader};

/// A place name pulled out of one search result, with where it came from.
#[derive(Debug, Clone)]
pub struct CandidatePlace {
    pub name: String,
    /// URL or search term of the result the name was extracted from.
    pub source: String,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("prompt rendering failed: {0}")]
    Prompt(#[from] PromptError),

    #[error("extraction returned no content")]
    NoContent,

    #[error("malformed extraction response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Pulls candidate place names out of free text.
#[async_trait]
pub trait PlaceExtractor: Send + Sync {
    async fn extract_place_candidates(&self, text: &str) -> Result<Vec<String>, ExtractError>;
}

#[derive(Debug, Deserialize)]
struct ExtractedNames {
    #[serde(default)]
    extracted_names: Vec<ExtractedName>,
}

#[derive(Debug, Deserialize)]
struct ExtractedName {
    name: String,
    #[serde(default)]
    reasoning: String,
}

/// Extraction backed by a JSON-mode LLM call.
pub struct LlmPlaceExtractor {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
}

impl LlmPlaceExtractor {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>) -> Self {
        debug!("LlmPlaceExtractor::new: called");
        Self { llm, prompts, max_tokens: 1024 }
    }
}

#[async_trait]
impl PlaceExtractor for LlmPlaceExtractor {
    async fn extract_place_candidates(&self, text: &str) -> Result<Vec<String>, ExtractError> {
        let structure = serde_json::json!({
            "extracted_names": [
                {"name": "<the place name>", "reasoning": "<why this is a visitable place>"}
            ]
        });
        let system_prompt = self.prompts.render(
            "extract-places",
            &serde_json::json!({
                "structure": serde_json::to_string_pretty(&structure)
                    .unwrap_or_else(|_| structure.to_string()),
            }),
        )?;

        let request =
            CompletionRequest::json(system_prompt, vec![Message::user(text)], self.max_tokens);
        let response = self.llm.complete(request).await?;
        let content = response.content.ok_or(ExtractError::NoContent)?;
        let parsed: ExtractedNames = parse_json(&content)?;

        let names: Vec<String> = parsed
            .extracted_names
            .into_iter()
            .filter(|e| !e.name.trim().is_empty())
            .inspect(|e| debug!(name = %e.name, reasoning = %e.reasoning, "extracted place"))
            .map(|e| e.name)
            .collect();

        debug!(count = names.len(), "LlmPlaceExtractor::extract_place_candidates: finished");
        Ok(names)
    }
}
