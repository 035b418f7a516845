//! Requirement-gathering state machine
//!
//! Gather asks for what is missing, presenting to the human suspends the
//! run, and validation re-reads the whole conversation through an extraction
//! prompt before merging the valid fields forward. The loop exits once a
//! pass produces no errors and every required field is gathered; a turn
//! limit keeps a conversation that never converges from looping forever.
//!
//! Suspension is explicit: [`Step::AwaitInput`] hands the caller a
//! checkpoint to persist, and [`ElicitationWorkflow::resume`] picks the run
//! back up after the user answers.

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::llm::{CompletionRequest, LlmClient, Message, parse_json};
use crate::prompts::PromptLoader;
use crate::schema::{RequirementSchema, RequirementState, ValidationOutcome, partial_validate};
use crate::session::ElicitationCheckpoint;
use crate::workflow::{Intent, WorkflowError};

/// What the state machine handed back control for.
#[derive(Debug)]
pub enum Step {
    /// Suspended at the human boundary. Persist the checkpoint, show the
    /// prompt, and call `resume` with it once the user answers.
    AwaitInput { checkpoint: ElicitationCheckpoint, prompt: String },
    /// Every required field gathered and valid, defaults filled in.
    Done { intent: Intent, requirements: RequirementState },
    /// The loop ran out of turns before converging.
    TurnLimit { intent: Intent, requirements: RequirementState },
}

pub struct ElicitationWorkflow {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    max_turns: u32,
    max_tokens: u32,
}

impl ElicitationWorkflow {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptLoader>,
        max_turns: u32,
        max_tokens: u32,
    ) -> Self {
        debug!(max_turns, "ElicitationWorkflow::new: called");
        Self { llm, prompts, max_turns, max_tokens }
    }

    /// Enter the machine for a fresh intent: ask the first gathering
    /// question and suspend.
    pub async fn begin(
        &self,
        intent: Intent,
        history: &mut Vec<Message>,
    ) -> Result<Step, WorkflowError> {
        debug!(intent = intent.label(), "ElicitationWorkflow::begin: called");
        let schema = schema_for(intent)?;
        let checkpoint = ElicitationCheckpoint::new(intent);

        let prompt = self.gather(&schema, &checkpoint, history, None).await?;
        history.push(Message::assistant(prompt.clone()));
        Ok(Step::AwaitInput { checkpoint, prompt })
    }

    /// Resume after the user answered. The caller has already appended the
    /// user's reply to `history`.
    pub async fn resume(
        &self,
        mut checkpoint: ElicitationCheckpoint,
        history: &mut Vec<Message>,
    ) -> Result<Step, WorkflowError> {
        debug!(
            intent = checkpoint.intent.label(),
            turns = checkpoint.turns,
            "ElicitationWorkflow::resume: called"
        );
        let schema = schema_for(checkpoint.intent)?;

        let outcome = self.validate(&schema, history).await?;
        checkpoint.requirements.merge(&outcome.valid);

        if outcome.is_clean() && schema.is_complete(&checkpoint.requirements) {
            checkpoint.requirements.apply_defaults(&schema);
            debug!("ElicitationWorkflow::resume: requirements complete");
            return Ok(Step::Done {
                intent: checkpoint.intent,
                requirements: checkpoint.requirements,
            });
        }

        checkpoint.turns += 1;
        if checkpoint.turns >= self.max_turns {
            debug!(turns = checkpoint.turns, "ElicitationWorkflow::resume: turn limit reached");
            return Ok(Step::TurnLimit {
                intent: checkpoint.intent,
                requirements: checkpoint.requirements,
            });
        }

        let prompt = self.gather(&schema, &checkpoint, history, Some(&outcome)).await?;
        history.push(Message::assistant(prompt.clone()));
        Ok(Step::AwaitInput { checkpoint, prompt })
    }

    /// Produce the next question for the user. Already-valid fields are
    /// summarized so the model never re-asks for them; fresh validation
    /// errors are spelled out so it asks for corrections.
    async fn gather(
        &self,
        schema: &RequirementSchema,
        checkpoint: &ElicitationCheckpoint,
        history: &[Message],
        outcome: Option<&ValidationOutcome>,
    ) -> Result<String, WorkflowError> {
        let mut gathered = checkpoint.requirements.summary_lines();
        if let Some(outcome) = outcome
            && !outcome.is_clean()
        {
            gathered.push_str(
                "\n\nProblems with details provided so far, ask the user to correct these:\n",
            );
            gathered.push_str(&outcome.error_lines());
        }

        let base = self.prompts.render(
            "gather-requirements",
            &serde_json::json!({
                "information_description": schema.description_lines(),
                "stay_search": checkpoint.intent == Intent::StaySearch,
            }),
        )?;
        let info = self
            .prompts
            .render("gather-info", &serde_json::json!({ "gathered_info": gathered }))?;
        let system_prompt = format!("{base}\n\n{info}");

        let request = CompletionRequest::text(system_prompt, history.to_vec(), self.max_tokens);
        let response = self.llm.complete(request).await?;
        response.content.ok_or(WorkflowError::NoContent)
    }

    /// Re-read the whole conversation through the extraction prompt and run
    /// partial validation over whatever comes back.
    async fn validate(
        &self,
        schema: &RequirementSchema,
        history: &[Message],
    ) -> Result<ValidationOutcome, WorkflowError> {
        let structure = schema.structure_hint();
        let system_prompt = self.prompts.render(
            "extract-requirements",
            &serde_json::json!({
                "now": chrono::Utc::now().format("%A %Y-%m-%d").to_string(),
                "structure": serde_json::to_string_pretty(&structure)
                    .unwrap_or_else(|_| structure.to_string()),
            }),
        )?;

        let request = CompletionRequest::json(system_prompt, history.to_vec(), self.max_tokens);
        let response = self.llm.complete(request).await?;
        let content = response.content.ok_or(WorkflowError::NoContent)?;
        debug!(extraction = %content, "ElicitationWorkflow::validate: extracted");

        let raw: serde_json::Map<String, Value> = parse_json(&content)?;
        Ok(partial_validate(schema, &raw))
    }
}

fn schema_for(intent: Intent) -> Result<RequirementSchema, WorkflowError> {
    intent
        .schema()
        .ok_or_else(|| WorkflowError::UnsupportedIntent { intent: intent.label().to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn workflow(client: Arc<MockLlmClient>, max_turns: u32) -> ElicitationWorkflow {
        ElicitationWorkflow::new(client, Arc::new(PromptLoader::embedded_only()), max_turns, 1024)
    }

    const COMPLETE_EXTRACTION: &str = r#"{
        "location": "Goa",
        "check_in_date": "2026-06-01",
        "check_out_date": "2026-06-05",
        "number_of_adults": 2,
        "number_of_children": 1,
        "budget_per_night": 5000,
        "reasoning": "all stated directly"
    }"#;

    #[tokio::test]
    async fn test_begin_asks_and_suspends() {
        let client = Arc::new(MockLlmClient::with_texts(vec!["Where would you like to stay?"]));
        let workflow = workflow(client.clone(), 8);
        let mut history = vec![Message::user("I need a hotel")];

        let step = workflow.begin(Intent::StaySearch, &mut history).await.unwrap();

        match step {
            Step::AwaitInput { checkpoint, prompt } => {
                assert_eq!(prompt, "Where would you like to stay?");
                assert_eq!(checkpoint.turns, 0);
                assert!(checkpoint.requirements.is_empty());
            }
            other => panic!("expected AwaitInput, got {other:?}"),
        }
        // The question lands in history as the assistant turn.
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].as_text(), Some("Where would you like to stay?"));

        // Gathering for a stay also asks about accommodation preferences.
        let system = client.requests()[0].system_prompt.clone();
        assert!(system.contains("Accommodation Preferences"));
        assert!(system.contains("- location:"));
        assert!(system.contains("Nothing gathered yet."));
    }

    #[tokio::test]
    async fn test_resume_completes_when_extraction_is_full() {
        let client = Arc::new(MockLlmClient::with_texts(vec![COMPLETE_EXTRACTION]));
        let workflow = workflow(client.clone(), 8);
        let mut history = vec![
            Message::user("I need a hotel"),
            Message::assistant("Where to, when, and what budget?"),
            Message::user("Goa, June 1st to 5th 2026, 2 adults, 5000 per night"),
        ];

        let checkpoint = ElicitationCheckpoint::new(Intent::StaySearch);
        let step = workflow.resume(checkpoint, &mut history).await.unwrap();

        match step {
            Step::Done { intent, requirements } => {
                assert_eq!(intent, Intent::StaySearch);
                assert_eq!(requirements.get("location"), Some(&Value::from("Goa")));
                assert_eq!(requirements.get("number_of_children"), Some(&Value::from(1)));
            }
            other => panic!("expected Done, got {other:?}"),
        }
        // Validation only; no gathering call once complete.
        assert_eq!(client.call_count(), 1);
        assert!(client.requests()[0].json_response);
    }

    #[tokio::test]
    async fn test_resume_loops_on_partial_extraction() {
        let client = Arc::new(MockLlmClient::with_texts(vec![
            r#"{"location": "Goa", "check_in_date": null, "reasoning": "only location given"}"#,
            "Great, Goa it is. When do you want to check in and out?",
        ]));
        let workflow = workflow(client.clone(), 8);
        let mut history = vec![
            Message::user("I need a hotel"),
            Message::assistant("Where to?"),
            Message::user("Goa"),
        ];

        let checkpoint = ElicitationCheckpoint::new(Intent::StaySearch);
        let step = workflow.resume(checkpoint, &mut history).await.unwrap();

        match step {
            Step::AwaitInput { checkpoint, prompt } => {
                assert!(prompt.contains("check in"));
                assert_eq!(checkpoint.turns, 1);
                assert_eq!(checkpoint.requirements.get("location"), Some(&Value::from("Goa")));
            }
            other => panic!("expected AwaitInput, got {other:?}"),
        }

        // The follow-up gathering prompt already knows about Goa.
        let gather_system = client.requests()[1].system_prompt.clone();
        assert!(gather_system.contains("- location: Goa"));
    }

    #[tokio::test]
    async fn test_resume_reports_cross_field_errors() {
        let client = Arc::new(MockLlmClient::with_texts(vec![
            r#"{
                "location": "Goa",
                "check_in_date": "2026-06-05",
                "check_out_date": "2026-06-01",
                "number_of_adults": 2,
                "budget_per_night": 5000,
                "reasoning": "dates look inverted"
            }"#,
            "Those dates seem swapped. When do you check in?",
        ]));
        let workflow = workflow(client.clone(), 8);
        let mut history = vec![
            Message::user("Goa, 2 adults, 5000 a night, June 5th to June 1st 2026"),
            Message::assistant("Let me confirm the details"),
            Message::user("yes"),
        ];

        let checkpoint = ElicitationCheckpoint::new(Intent::StaySearch);
        let step = workflow.resume(checkpoint, &mut history).await.unwrap();

        // Cross-field failure loops instead of exiting, and the gathering
        // prompt carries the correction request.
        assert!(matches!(step, Step::AwaitInput { .. }));
        let gather_system = client.requests()[1].system_prompt.clone();
        assert!(gather_system.contains("check_out_date: must be after check_in_date"));

        // The independently valid fields were still kept.
        match step {
            Step::AwaitInput { checkpoint, .. } => {
                assert_eq!(checkpoint.requirements.get("location"), Some(&Value::from("Goa")));
                assert_eq!(
                    checkpoint.requirements.get("check_in_date"),
                    Some(&Value::from("2026-06-05"))
                );
            }
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_turn_limit_ends_the_loop() {
        let client = Arc::new(MockLlmClient::with_texts(vec![
            r#"{"location": "Goa", "reasoning": "nothing else yet"}"#,
        ]));
        let workflow = workflow(client, 1);
        let mut history = vec![Message::user("hotel in goa"), Message::assistant("when?"), Message::user("not sure")];

        let checkpoint = ElicitationCheckpoint::new(Intent::StaySearch);
        let step = workflow.resume(checkpoint, &mut history).await.unwrap();

        match step {
            Step::TurnLimit { requirements, .. } => {
                assert_eq!(requirements.get("location"), Some(&Value::from("Goa")));
            }
            other => panic!("expected TurnLimit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_extraction_is_an_error() {
        let client = Arc::new(MockLlmClient::with_texts(vec!["I could not extract anything"]));
        let workflow = workflow(client, 8);
        let mut history = vec![Message::user("hotel"), Message::assistant("where?"), Message::user("hm")];

        let checkpoint = ElicitationCheckpoint::new(Intent::StaySearch);
        let result = workflow.resume(checkpoint, &mut history).await;

        assert!(matches!(result, Err(WorkflowError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_begin_rejects_general_intent() {
        let client = Arc::new(MockLlmClient::with_texts(Vec::<String>::new()));
        let workflow = workflow(client, 8);
        let mut history = vec![];

        let result = workflow.begin(Intent::Other, &mut history).await;

        assert!(matches!(result, Err(WorkflowError::UnsupportedIntent { .. })));
    }
}
