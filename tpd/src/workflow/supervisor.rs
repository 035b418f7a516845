//! Turn-level orchestration
//!
//! One [`Supervisor::handle_turn`] call is one user turn. The supervisor
//! loads the session checkpoint, resumes a suspended gathering run if one is
//! parked there, otherwise classifies the fresh request and either answers
//! directly (general chat) or starts gathering. Completed requirement sets
//! are routed to the matching workflow, and the checkpoint is saved back
//! before the reply leaves, so a process restart never loses a turn.

use chrono::Utc;
use eyre::Result;
use sessionstore::SessionStore;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::extract::{DedupeConfig, LlmPlaceExtractor, PlaceExtractor};
use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::prompts::PromptLoader;
use crate::schema::RequirementState;
use crate::session::SessionCheckpoint;
use crate::tools::{CapabilityMap, ToolExecutor};
use crate::workflow::{
    ElicitationWorkflow, Intent, IntentClassifier, RecommendationWorkflow, StaySearchWorkflow,
    Step, WorkflowError,
};

/// What a turn produced. `AwaitingInput` means the session is suspended on a
/// gathering question; the next turn resumes it.
#[derive(Debug)]
pub enum TurnOutcome {
    AwaitingInput { prompt: String },
    Final { reply: String },
}

pub struct Supervisor {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    store: Arc<SessionStore>,
    intents: IntentClassifier,
    elicitation: ElicitationWorkflow,
    recommendation: RecommendationWorkflow,
    stay: StaySearchWorkflow,
    max_tokens: u32,
}

impl Supervisor {
    pub fn new(
        config: &Config,
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptLoader>,
        store: Arc<SessionStore>,
        executor: Arc<ToolExecutor>,
        capabilities: Arc<CapabilityMap>,
    ) -> Self {
        debug!("Supervisor::new: called");
        let extractor: Arc<dyn PlaceExtractor> =
            Arc::new(LlmPlaceExtractor::new(llm.clone(), prompts.clone()));
        let dedupe = DedupeConfig { threshold: config.dedupe.threshold, ..DedupeConfig::default() }
            .with_extra_regions(&config.dedupe.excluded_regions);
        let max_tokens = config.llm.max_tokens;

        Self {
            intents: IntentClassifier::new(llm.clone(), prompts.clone()),
            elicitation: ElicitationWorkflow::new(
                llm.clone(),
                prompts.clone(),
                config.elicitation.max_turns,
                max_tokens,
            ),
            recommendation: RecommendationWorkflow::new(
                llm.clone(),
                prompts.clone(),
                executor.clone(),
                capabilities.clone(),
                extractor,
                &config.recommendation,
                dedupe,
                max_tokens,
            ),
            stay: StaySearchWorkflow::new(
                llm.clone(),
                prompts.clone(),
                executor,
                capabilities,
                max_tokens,
            ),
            llm,
            prompts,
            store,
            max_tokens,
        }
    }

    /// Process one user turn for a session and persist the updated
    /// checkpoint before returning.
    pub async fn handle_turn(&self, session_id: &str, user_text: &str) -> Result<TurnOutcome> {
        debug!(session_id, "Supervisor::handle_turn: called");

        let mut session: SessionCheckpoint = self
            .store
            .load(session_id)?
            .unwrap_or_else(|| SessionCheckpoint::new(session_id));
        session.history.push(Message::user(user_text));

        let step = if let Some(suspended) = session.elicitation.take() {
            debug!(session_id, "Supervisor::handle_turn: resuming suspended gathering");
            self.elicitation.resume(suspended, &mut session.history).await?
        } else {
            let intent = match self.intents.classify(user_text).await {
                Ok(intent) => intent,
                // An off-catalog label from the model is a routing miss,
                // not a failed turn; fall through to general chat.
                Err(WorkflowError::ClassificationMismatch { label }) => {
                    warn!(label, "Supervisor::handle_turn: unknown intent label");
                    Intent::Other
                }
                Err(e) => return Err(e.into()),
            };
            debug!(intent = intent.label(), "Supervisor::handle_turn: classified");

            if intent == Intent::Other {
                let reply = self.general_reply(&session.history).await?;
                session.history.push(Message::assistant(&reply));
                return self.finish(session, TurnOutcome::Final { reply });
            }

            self.elicitation.begin(intent, &mut session.history).await?
        };

        let outcome = match step {
            Step::AwaitInput { checkpoint, prompt } => {
                session.elicitation = Some(checkpoint);
                TurnOutcome::AwaitingInput { prompt }
            }
            Step::Done { intent, requirements } => {
                let reply = self.route(intent, &requirements, &session.history).await?;
                session.history.push(Message::assistant(&reply));
                TurnOutcome::Final { reply }
            }
            Step::TurnLimit { intent, .. } => {
                warn!(intent = intent.label(), "Supervisor::handle_turn: gathering hit turn limit");
                let reply = "I could not pin down all the details I need after several \
                             attempts. Let us start over: send the key facts in one message \
                             and I will take it from there."
                    .to_string();
                session.history.push(Message::assistant(&reply));
                TurnOutcome::Final { reply }
            }
        };

        self.finish(session, outcome)
    }

    fn finish(&self, mut session: SessionCheckpoint, outcome: TurnOutcome) -> Result<TurnOutcome> {
        session.touch();
        self.store.save(&session.session_id, &session)?;
        Ok(outcome)
    }

    async fn route(
        &self,
        intent: Intent,
        requirements: &RequirementState,
        history: &[Message],
    ) -> Result<String, WorkflowError> {
        debug!(intent = intent.label(), "Supervisor::route: called");
        match intent {
            Intent::StaySearch => self.stay.run(requirements, history).await,
            Intent::DestinationRecommendation => {
                let report = self.recommendation.run(requirements).await?;
                if report.is_empty() {
                    Ok("I could not find any destination ideas for those requirements. \
                        Widening the budget or shifting the dates might help."
                        .to_string())
                } else {
                    Ok(report)
                }
            }
            // Gathering never starts for general chat, so a completed run
            // cannot carry this intent.
            Intent::Other => {
                Err(WorkflowError::UnsupportedIntent { intent: intent.label().to_string() })
            }
        }
    }

    /// Plain one-shot completion over the conversation for anything outside
    /// the travel workflows.
    async fn general_reply(&self, history: &[Message]) -> Result<String, WorkflowError> {
        debug!("Supervisor::general_reply: called");
        let system_prompt = self.prompts.render(
            "general",
            &serde_json::json!({ "now": Utc::now().format("%A %Y-%m-%d").to_string() }),
        )?;
        let request = CompletionRequest::text(system_prompt, history.to_vec(), self.max_tokens);
        let response = self.llm.complete(request).await?;
        response.content.ok_or(WorkflowError::NoContent)
    }
}
