//! ToolExecutor - name-keyed tool registry with failure middleware
//!
//! Every agent loop executes calls through here. Failures are not propagated
//! as errors; they come back as tool messages that tell the model no data was
//! found and to stop working on the request, matching how the workflows
//! expect a dead-end branch to wind down.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::config::ToolsConfig;
use crate::llm::{ToolCall, ToolDefinition};

use super::builtin::{
    FetchPageTool, FindStayLocationsTool, GetWeatherTool, SearchPlacesTool, SearchStaysTool, SearchWebTool,
    StayReviewsTool,
};
use super::{Tool, ToolResult};

/// Manages tool execution for the agent loops
pub struct ToolExecutor {
    tools: HashMap<String, Box<dyn Tool>>,
    timeout: Duration,
}

impl ToolExecutor {
    /// Create executor with the standard travel toolkit
    pub fn standard(config: &ToolsConfig) -> Self {
        debug!("ToolExecutor::standard: called");
        let mut tools: HashMap<String, Box<dyn Tool>> = HashMap::new();

        // Web research
        tools.insert("search_web".into(), Box::new(SearchWebTool));
        tools.insert("fetch_page".into(), Box::new(FetchPageTool::new()));

        // Weather
        tools.insert("get_weather".into(), Box::new(GetWeatherTool::new()));

        // Mapping
        tools.insert("search_places".into(), Box::new(SearchPlacesTool::new()));

        // Guest stays
        tools.insert("find_stay_locations".into(), Box::new(FindStayLocationsTool::new()));
        tools.insert("search_stays".into(), Box::new(SearchStaysTool::new()));
        tools.insert("fetch_stay_reviews".into(), Box::new(StayReviewsTool::new()));

        Self {
            tools,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Create an empty executor (for testing)
    pub fn empty() -> Self {
        debug!("ToolExecutor::empty: called");
        Self {
            tools: HashMap::new(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Add a tool to the executor
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        debug!(tool_name = %tool.name(), "ToolExecutor::add_tool: called");
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get tool definitions for the LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        debug!("ToolExecutor::definitions: called");
        self.tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Get definitions for a subset of tools by name
    pub fn definitions_for(&self, tool_names: &[String]) -> Vec<ToolDefinition> {
        debug!(?tool_names, "ToolExecutor::definitions_for: called");
        tool_names
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a tool call, converting failures into stop messages
    pub async fn execute(&self, tool_call: &ToolCall) -> ToolResult {
        debug!(tool_name = %tool_call.name, tool_id = %tool_call.id, "ToolExecutor::execute: called");
        let Some(tool) = self.tools.get(&tool_call.name) else {
            debug!("ToolExecutor::execute: unknown tool");
            return ToolResult::error(format!("Unknown tool: {}", tool_call.name));
        };

        match timeout(self.timeout, tool.execute(tool_call.input.clone())).await {
            Ok(result) if result.is_error => {
                debug!(tool_name = %tool_call.name, "ToolExecutor::execute: tool failed");
                ToolResult::error(format!(
                    "No data found. {} Please stop processing this request.",
                    result.content
                ))
            }
            Ok(result) => result,
            Err(_) => {
                debug!(tool_name = %tool_call.name, "ToolExecutor::execute: timed out");
                ToolResult::error("Tool execution timed out or was cancelled")
            }
        }
    }

    /// Execute multiple tool calls in order
    pub async fn execute_all(&self, tool_calls: &[ToolCall]) -> Vec<(String, ToolResult)> {
        debug!(count = %tool_calls.len(), "ToolExecutor::execute_all: called");
        let mut results = Vec::with_capacity(tool_calls.len());

        for call in tool_calls {
            let result = self.execute(call).await;
            results.push((call.id.clone(), result));
        }

        results
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get tool names
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn description(&self) -> &'static str {
            "Always fails"
        }

        fn input_schema(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _input: Value) -> ToolResult {
            ToolResult::error("upstream returned 500")
        }
    }

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn description(&self) -> &'static str {
            "Never finishes in time"
        }

        fn input_schema(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _input: Value) -> ToolResult {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            ToolResult::success("too late")
        }
    }

    fn call(name: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            input: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let executor = ToolExecutor::empty();
        let result = executor.execute(&call("nope")).await;

        assert!(result.is_error);
        assert!(result.content.contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_failure_becomes_stop_message() {
        let mut executor = ToolExecutor::empty();
        executor.add_tool(Box::new(FailingTool));

        let result = executor.execute(&call("failing")).await;

        assert!(result.is_error);
        assert!(result.content.starts_with("No data found. upstream returned 500"));
        assert!(result.content.ends_with("Please stop processing this request."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_message() {
        let mut executor = ToolExecutor::empty();
        executor.add_tool(Box::new(SlowTool));

        let result = executor.execute(&call("slow")).await;

        assert!(result.is_error);
        assert_eq!(result.content, "Tool execution timed out or was cancelled");
    }

    #[tokio::test]
    async fn test_definitions_for_subset() {
        let mut executor = ToolExecutor::empty();
        executor.add_tool(Box::new(FailingTool));
        executor.add_tool(Box::new(SlowTool));

        let defs = executor.definitions_for(&["slow".to_string(), "missing".to_string()]);

        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "slow");
    }
}
