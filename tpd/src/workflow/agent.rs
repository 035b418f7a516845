//! The agent loop: completion, tool execution, repeat
//!
//! Runs one LLM-with-tools conversation to its end. Tool failures never
//! surface here as errors; the executor folds them into tool messages and
//! the model reads those and winds the request down on its own.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::llm::{CompletionRequest, ContentBlock, LlmClient, Message};
use crate::tools::ToolExecutor;
use crate::workflow::WorkflowError;

/// Hard stop on completion/execution rounds in one run. A healthy run ends
/// well before this; hitting it means the model is spinning on tools.
const MAX_ITERATIONS: u32 = 8;

pub struct AgentRunner {
    llm: Arc<dyn LlmClient>,
    executor: Arc<ToolExecutor>,
    max_tokens: u32,
}

impl AgentRunner {
    pub fn new(llm: Arc<dyn LlmClient>, executor: Arc<ToolExecutor>, max_tokens: u32) -> Self {
        debug!("AgentRunner::new: called");
        Self { llm, executor, max_tokens }
    }

    /// Drive the loop until the model answers in plain text.
    ///
    /// `tool_names` limits what the model sees to one capability bucket;
    /// an empty slice makes this a plain completion.
    pub async fn run(
        &self,
        system_prompt: &str,
        mut messages: Vec<Message>,
        tool_names: &[String],
    ) -> Result<String, WorkflowError> {
        debug!(tools = tool_names.len(), "AgentRunner::run: called");
        let definitions = self.executor.definitions_for(tool_names);

        for iteration in 0..MAX_ITERATIONS {
            let request = CompletionRequest {
                system_prompt: system_prompt.to_string(),
                messages: messages.clone(),
                tools: definitions.clone(),
                max_tokens: self.max_tokens,
                json_response: false,
            };
            let response = self.llm.complete(request).await?;

            if response.tool_calls.is_empty() {
                let text = response.content.unwrap_or_default();
                if text.is_empty() {
                    warn!(iteration, "AgentRunner::run: model ended with no content");
                }
                debug!(iteration, "AgentRunner::run: finished");
                return Ok(text);
            }

            let mut blocks = Vec::new();
            if let Some(ref text) = response.content {
                blocks.push(ContentBlock::text(text.clone()));
            }
            for call in &response.tool_calls {
                blocks.push(ContentBlock::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: call.input.clone(),
                });
            }
            messages.push(Message::assistant_blocks(blocks));

            let results = self.executor.execute_all(&response.tool_calls).await;
            let result_blocks = results
                .into_iter()
                .map(|(id, result)| ContentBlock::tool_result(id, result.content, result.is_error))
                .collect();
            messages.push(Message::tool_results(result_blocks));
        }

        // Out of rounds: ask for a plain-text wrap-up with the tools gone.
        warn!("AgentRunner::run: iteration cap reached, forcing a final answer");
        messages.push(Message::user(
            "Wrap up now. Answer with what you have gathered so far, without calling any more tools.",
        ));
        let request =
            CompletionRequest::text(system_prompt.to_string(), messages, self.max_tokens);
        let response = self.llm.complete(request).await?;
        Ok(response.content.unwrap_or_default())
    }
}
