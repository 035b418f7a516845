//! Stay search over the booking tool bucket
//!
//! Once elicitation has confirmed the booking requirements, a single agent
//! run carries the conversation forward: the model searches locations,
//! stays, and guest reviews through the hotel tools and answers with ranked
//! options. No fan-out here; the tools themselves do the legwork.

use std::sync::Arc;
use tracing::debug;

use crate::llm::{LlmClient, Message};
use crate::prompts::PromptLoader;
use crate::schema::RequirementState;
use crate::tools::{Capability, CapabilityMap, ToolExecutor};
use crate::workflow::{AgentRunner, WorkflowError};

pub struct StaySearchWorkflow {
    agent: AgentRunner,
    prompts: Arc<PromptLoader>,
    capabilities: Arc<CapabilityMap>,
}

impl StaySearchWorkflow {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptLoader>,
        executor: Arc<ToolExecutor>,
        capabilities: Arc<CapabilityMap>,
        max_tokens: u32,
    ) -> Self {
        debug!("StaySearchWorkflow::new: called");
        Self { agent: AgentRunner::new(llm, executor, max_tokens), prompts, capabilities }
    }

    /// Run the booking agent over the conversation so far. The confirmed
    /// requirements ride along as a final user message so the agent never
    /// has to re-derive them from chat history.
    pub async fn run(
        &self,
        requirements: &RequirementState,
        history: &[Message],
    ) -> Result<String, WorkflowError> {
        debug!("StaySearchWorkflow::run: called");

        let system_prompt = self.prompts.render("search-stays", &serde_json::json!({}))?;
        let tools = self.capabilities.tools_for(&[Capability::HotelStays]);

        let mut messages = history.to_vec();
        messages.push(Message::user(format!(
            "Confirmed stay requirements:\n{}",
            requirements.summary_lines()
        )));

        self.agent.run(&system_prompt, messages, &tools).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use serde_json::Value;

    fn requirements() -> RequirementState {
        let mut state = RequirementState::new();
        state.insert("location", Value::from("Goa"));
        state.insert("check_in_date", Value::from("2026-02-01"));
        state.insert("check_out_date", Value::from("2026-02-05"));
        state.insert("number_of_adults", Value::from(2));
        state
    }

    #[tokio::test]
    async fn test_run_appends_requirements_and_returns_reply() {
        let llm = Arc::new(MockLlmClient::with_texts(vec![
            "**Seaside Inn** - INR 20000 (INR 5000 per night)",
        ]));
        let workflow = StaySearchWorkflow::new(
            llm.clone(),
            Arc::new(PromptLoader::embedded_only()),
            Arc::new(ToolExecutor::empty()),
            Arc::new(CapabilityMap::default()),
            1024,
        );

        let history = vec![Message::user("I want a beach stay in Goa")];
        let reply = workflow.run(&requirements(), &history).await.unwrap();

        assert!(reply.contains("Seaside Inn"));

        let request = llm.requests().remove(0);
        assert!(request.system_prompt.contains("hotel booking assistant"));
        assert_eq!(request.messages.len(), 2);
        let last = request.messages.last().expect("final message");
        let text = last.as_text().expect("text message");
        assert!(text.contains("Confirmed stay requirements:"));
        assert!(text.contains("- location: Goa"));
        assert!(text.contains("- check_in_date: 2026-02-01"));
    }
}
