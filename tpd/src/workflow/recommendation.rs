//! Destination recommendation pipeline
//!
//! Five stages: a web-search agent consolidates sources, extraction mines
//! each source for place names in parallel, near-duplicates are filtered,
//! each surviving place is investigated in parallel, and the per-place
//! write-ups are concatenated into one report. Branch failures are absorbed
//! where they happen: a dead source or a failed investigation contributes
//! nothing instead of killing its siblings, and no sources at all means an
//! empty report, not an error.

use futures::StreamExt;
use futures::stream;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::RecommendationConfig;
use crate::extract::{
    CandidatePlace, DedupeConfig, PageFetcher, PlaceExtractor, filter_similar_phrases,
};
use crate::llm::{LlmClient, Message};
use crate::prompts::PromptLoader;
use crate::schema::RequirementState;
use crate::tools::{Capability, CapabilityMap, ToolExecutor};
use crate::workflow::{AgentRunner, WorkflowError};

/// Characters of page body handed to extraction per parsed source.
const PAGE_TEXT_CHARS: usize = 16_000;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub search_term: String,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    search_results: Vec<SearchHit>,
}

/// Everything one investigation task needs, owned, so branches share nothing
/// mutable.
#[derive(Debug, Clone)]
struct InvestigationBranch {
    place: String,
    nationality: String,
    travel_window: String,
    requirements_summary: String,
}

pub struct RecommendationWorkflow {
    agent: AgentRunner,
    prompts: Arc<PromptLoader>,
    capabilities: Arc<CapabilityMap>,
    extractor: Arc<dyn PlaceExtractor>,
    fetcher: PageFetcher,
    dedupe: DedupeConfig,
    max_search_results: usize,
    max_parsed_pages: usize,
    max_concurrent: usize,
}

impl RecommendationWorkflow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptLoader>,
        executor: Arc<ToolExecutor>,
        capabilities: Arc<CapabilityMap>,
        extractor: Arc<dyn PlaceExtractor>,
        config: &RecommendationConfig,
        dedupe: DedupeConfig,
        max_tokens: u32,
    ) -> Self {
        debug!("RecommendationWorkflow::new: called");
        Self {
            agent: AgentRunner::new(llm, executor, max_tokens),
            prompts,
            capabilities,
            extractor,
            fetcher: PageFetcher::new(PAGE_TEXT_CHARS),
            dedupe,
            max_search_results: config.max_search_results,
            max_parsed_pages: config.max_parsed_pages,
            max_concurrent: config.max_concurrent_branches.max(1),
        }
    }

    /// Run the whole pipeline for a validated requirement set. Returns the
    /// aggregated report, or an empty string when nothing could be found.
    pub async fn run(&self, requirements: &RequirementState) -> Result<String, WorkflowError> {
        debug!("RecommendationWorkflow::run: called");

        let hits = self.perform_web_search(requirements).await?;
        if hits.is_empty() {
            debug!("RecommendationWorkflow::run: no search results, returning empty report");
            return Ok(String::new());
        }

        let candidates = self.extract_candidates(&hits).await;
        let names: Vec<String> = candidates.iter().map(|c| c.name.clone()).collect();
        let unique = filter_similar_phrases(&names, &self.dedupe);
        debug!(
            candidates = names.len(),
            unique = unique.len(),
            "RecommendationWorkflow::run: deduplicated candidates"
        );
        if unique.is_empty() {
            return Ok(String::new());
        }

        let report = self.investigate_all(&unique, requirements).await;
        debug!(report_chars = report.len(), "RecommendationWorkflow::run: finished");
        Ok(report)
    }

    /// Stage 1: one agent run over the web and map buckets, consolidated
    /// into a bounded list of sources. The model reports its findings as
    /// JSON in its final message; an unparseable answer degrades to no
    /// sources rather than an error.
    async fn perform_web_search(
        &self,
        requirements: &RequirementState,
    ) -> Result<Vec<SearchHit>, WorkflowError> {
        let structure = serde_json::json!({
            "search_results": [
                {"url": "...", "title": "...", "domain": "...", "search_term": "..."}
            ]
        });
        let system_prompt = self.prompts.render(
            "web-search",
            &serde_json::json!({
                "user_preferences": requirements.summary_lines(),
                "source_count": self.max_search_results,
                "structure": serde_json::to_string_pretty(&structure)
                    .unwrap_or_else(|_| structure.to_string()),
            }),
        )?;

        let tools = self.capabilities.tools_for(&[Capability::Web, Capability::Map]);
        let answer = self
            .agent
            .run(
                &system_prompt,
                vec![Message::user(
                    "Research destinations that match the preferences and consolidate your findings.",
                )],
                &tools,
            )
            .await?;

        let mut hits = match crate::llm::parse_json::<SearchResults>(&answer) {
            Ok(results) => results.search_results,
            Err(e) => {
                warn!(error = %e, "perform_web_search: unparseable consolidation, treating as no results");
                Vec::new()
            }
        };
        hits.truncate(self.max_search_results);
        debug!(count = hits.len(), "perform_web_search: finished");
        Ok(hits)
    }

    /// Stage 2: fan out one extraction task per source. Only the first few
    /// sources get their pages fetched and parsed; the rest are mined from
    /// title metadata alone. Additive merge: every branch's candidates are
    /// concatenated, in completion order.
    async fn extract_candidates(&self, hits: &[SearchHit]) -> Vec<CandidatePlace> {
        let branches: Vec<Vec<CandidatePlace>> = stream::iter(
            hits.iter().enumerate().map(|(index, hit)| self.extract_branch(index, hit)),
        )
        .buffer_unordered(self.max_concurrent)
        .collect()
        .await;

        branches.into_iter().flatten().collect()
    }

    async fn extract_branch(&self, index: usize, hit: &SearchHit) -> Vec<CandidatePlace> {
        let text = if index < self.max_parsed_pages {
            match self.fetcher.fetch_markdown(&hit.url).await {
                Ok(body) => format!("# {}\nSource: {}\n\n{}", hit.title, hit.url, body),
                Err(e) => {
                    warn!(url = %hit.url, error = %e, "extract_branch: fetch failed, using title only");
                    title_only(hit)
                }
            }
        } else {
            title_only(hit)
        };

        match self.extractor.extract_place_candidates(&text).await {
            Ok(names) => names
                .into_iter()
                .map(|name| CandidatePlace { name, source: hit.url.clone() })
                .collect(),
            Err(e) => {
                warn!(url = %hit.url, error = %e, "extract_branch: extraction failed, contributing nothing");
                Vec::new()
            }
        }
    }

    /// Stages 4 and 5: investigate each place in parallel and append each
    /// finished write-up to the report as it completes. Completion order is
    /// not request order and that is fine; every section carries its own
    /// heading.
    async fn investigate_all(&self, places: &[String], requirements: &RequirementState) -> String {
        let contexts: Vec<InvestigationBranch> =
            places.iter().map(|place| self.branch_context(place, requirements)).collect();

        let mut completed = stream::iter(contexts.into_iter().map(|branch| async move {
            let outcome = self.investigate(&branch).await;
            (branch.place, outcome)
        }))
        .buffer_unordered(self.max_concurrent);

        let mut report = String::new();
        while let Some((place, outcome)) = completed.next().await {
            match outcome {
                Ok(text) if !text.trim().is_empty() => {
                    report.push_str(&format!("## {place}\n\n{}\n\n", text.trim()));
                }
                Ok(_) => warn!(%place, "investigate_all: empty write-up, skipping"),
                Err(e) => warn!(%place, error = %e, "investigate_all: branch failed, skipping"),
            }
        }

        report.trim_end().to_string()
    }

    async fn investigate(&self, branch: &InvestigationBranch) -> Result<String, WorkflowError> {
        debug!(place = %branch.place, "RecommendationWorkflow::investigate: called");
        let system_prompt = self
            .prompts
            .render("investigate-place", &serde_json::json!({ "nationality": branch.nationality }))?;

        let tools = self.capabilities.tools_for(&[Capability::Web, Capability::Weather]);
        self.agent
            .run(
                &system_prompt,
                vec![Message::user(format!(
                    "Destination: {}\nTravel dates: {}\nTraveller preferences:\n{}",
                    branch.place, branch.travel_window, branch.requirements_summary
                ))],
                &tools,
            )
            .await
    }

    fn branch_context(&self, place: &str, requirements: &RequirementState) -> InvestigationBranch {
        let nationality = requirements
            .get("nationality")
            .and_then(Value::as_str)
            .unwrap_or("Indian")
            .to_string();
        let travel_window = match (
            requirements.get("travel_start_date").and_then(Value::as_str),
            requirements.get("travel_end_date").and_then(Value::as_str),
        ) {
            (Some(start), Some(end)) => format!("{start} to {end}"),
            (Some(start), None) => format!("from {start}"),
            _ => "flexible".to_string(),
        };

        InvestigationBranch {
            place: place.to_string(),
            nationality,
            travel_window,
            requirements_summary: requirements.summary_lines(),
        }
    }
}

/// Extraction input for a source whose page is not fetched.
fn title_only(hit: &SearchHit) -> String {
    format!(
        "Search result title: {}\nDomain: {}\nFound for search term: {}",
        hit.title, hit.domain, hit.search_term
    )
}
