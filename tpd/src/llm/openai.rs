//! OpenAI-compatible chat-completions client
//!
//! Works against api.openai.com or any compatible endpoint via `base-url`.
//! One attempt per call: transient failures surface as errors for the host to
//! handle, they are not retried here.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{
    CompletionRequest, CompletionResponse, ContentBlock, LlmClient, LlmError, Message, MessageContent, Role,
    StopReason, TokenUsage, ToolCall,
};
use crate::config::LlmConfig;

/// OpenAI chat-completions client
pub struct OpenAIClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAIClient {
    /// Create a new client from configuration
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, "OpenAIClient::from_config: called");
        let api_key = config.api_key().map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    /// Build the request body for the chat-completions API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");

        let mut messages = vec![serde_json::json!({
            "role": "system",
            "content": request.system_prompt,
        })];

        messages.extend(convert_messages(&request.messages));

        let max_tokens = request.max_tokens.min(self.max_tokens);

        // GPT-5.x and o1/o3 models use max_completion_tokens instead of max_tokens
        let uses_completion_tokens =
            self.model.starts_with("gpt-5") || self.model.starts_with("o1") || self.model.starts_with("o3");

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if uses_completion_tokens {
            body["max_completion_tokens"] = serde_json::json!(max_tokens);
        } else {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            debug!(tool_count = request.tools.len(), "build_request_body: adding tools");
            body["tools"] = serde_json::json!(request.tools.iter().map(|t| t.to_openai_schema()).collect::<Vec<_>>());
            body["tool_choice"] = serde_json::json!("auto");
        }

        if request.json_response {
            debug!("build_request_body: JSON response mode");
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        body
    }

    /// Parse the chat-completions API response
    fn parse_response(&self, api_response: ChatResponse) -> CompletionResponse {
        let choice = api_response.choices.into_iter().next();

        let (content, tool_calls, stop_reason) = match choice {
            Some(c) => {
                let content = c.message.content;
                let tool_calls = c
                    .message
                    .tool_calls
                    .unwrap_or_default()
                    .into_iter()
                    .map(|tc| ToolCall {
                        id: tc.id,
                        name: tc.function.name,
                        input: serde_json::from_str(&tc.function.arguments).unwrap_or(serde_json::json!({})),
                    })
                    .collect();
                let stop_reason = c
                    .finish_reason
                    .as_deref()
                    .map(StopReason::from_finish_reason)
                    .unwrap_or(StopReason::EndTurn);
                (content, tool_calls, stop_reason)
            }
            None => (None, vec![], StopReason::EndTurn),
        };

        CompletionResponse {
            content,
            tool_calls,
            stop_reason,
            usage: TokenUsage {
                prompt_tokens: api_response.usage.prompt_tokens,
                completion_tokens: api_response.usage.completion_tokens,
            },
        }
    }
}

/// Convert internal messages to chat-completions wire format
///
/// The API takes one message per tool result, so a single tool-result turn
/// with multiple blocks becomes multiple wire messages.
fn convert_messages(messages: &[Message]) -> Vec<serde_json::Value> {
    let mut result = Vec::new();

    for msg in messages {
        match (&msg.role, &msg.content) {
            (Role::User, MessageContent::Text(text)) => {
                result.push(serde_json::json!({ "role": "user", "content": text }));
            }
            (Role::Assistant, MessageContent::Text(text)) => {
                result.push(serde_json::json!({ "role": "assistant", "content": text }));
            }
            (Role::Tool, content) => {
                for block in content_blocks(content) {
                    if let ContentBlock::ToolResult {
                        tool_call_id, content, ..
                    } = block
                    {
                        result.push(serde_json::json!({
                            "role": "tool",
                            "tool_call_id": tool_call_id,
                            "content": content,
                        }));
                    }
                }
            }
            (role, MessageContent::Blocks(blocks)) => {
                let mut tool_calls = Vec::new();
                let mut text_content = String::new();

                for block in blocks {
                    match block {
                        ContentBlock::Text { text } => text_content.push_str(text),
                        ContentBlock::ToolUse { id, name, input } => {
                            tool_calls.push(serde_json::json!({
                                "id": id,
                                "type": "function",
                                "function": {
                                    "name": name,
                                    "arguments": input.to_string(),
                                }
                            }));
                        }
                        // Tool results outside a Tool-role turn are a caller
                        // bug; drop them rather than send invalid wire data
                        ContentBlock::ToolResult { .. } => {}
                    }
                }

                if !tool_calls.is_empty() {
                    let mut wire = serde_json::json!({
                        "role": "assistant",
                        "tool_calls": tool_calls,
                    });
                    if !text_content.is_empty() {
                        wire["content"] = serde_json::json!(text_content);
                    }
                    result.push(wire);
                } else {
                    let role = match role {
                        Role::Assistant => "assistant",
                        _ => "user",
                    };
                    result.push(serde_json::json!({ "role": role, "content": text_content }));
                }
            }
        }
    }

    result
}

fn content_blocks(content: &MessageContent) -> &[ContentBlock] {
    match content {
        MessageContent::Blocks(blocks) => blocks,
        MessageContent::Text(_) => &[],
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, message_count = request.messages.len(), "complete: called");
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout)
                } else {
                    LlmError::Network(e)
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            debug!("complete: rate limited (429)");
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);

            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !response.status().is_success() {
            debug!(%status, "complete: provider error");
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider { status, message: text });
        }

        debug!("complete: success");
        let api_response: ChatResponse = response.json().await.map_err(LlmError::Network)?;
        Ok(self.parse_response(api_response))
    }
}

// Chat-completions API response types

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: ChatUsage,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ChatToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ChatToolCall {
    id: String,
    function: ChatFunction,
}

#[derive(Debug, Deserialize)]
struct ChatFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OpenAIClient {
        OpenAIClient {
            model: "gpt-4o".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://api.openai.com".to_string(),
            http: Client::new(),
            max_tokens: 8192,
            timeout: Duration::from_secs(300),
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let client = test_client();
        let request = CompletionRequest::text("You are helpful", vec![Message::user("Hello")], 1000);

        let body = client.build_request_body(&request);

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are helpful");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body.get("tools").is_none());
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_build_request_body_json_mode() {
        let client = test_client();
        let request = CompletionRequest::json("Extract fields", vec![Message::user("x")], 1000);

        let body = client.build_request_body(&request);
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_max_tokens_capped_by_config() {
        let client = OpenAIClient {
            max_tokens: 1000,
            ..test_client()
        };
        let request = CompletionRequest::text("Test", vec![], 5000);

        let body = client.build_request_body(&request);
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn test_convert_messages_tool_flow() {
        let messages = vec![
            Message::user("find stays in goa"),
            Message::assistant_blocks(vec![
                ContentBlock::text("Searching"),
                ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "search_web".to_string(),
                    input: serde_json::json!({"query": "goa stays"}),
                },
            ]),
            Message::tool_results(vec![
                ContentBlock::tool_result("call_1", "3 results", false),
                ContentBlock::tool_result("call_2", "No data found", true),
            ]),
        ];

        let wire = convert_messages(&messages);

        assert_eq!(wire.len(), 4);
        assert_eq!(wire[0]["role"], "user");
        assert_eq!(wire[1]["role"], "assistant");
        assert_eq!(wire[1]["tool_calls"][0]["function"]["name"], "search_web");
        assert_eq!(wire[1]["content"], "Searching");
        assert_eq!(wire[2]["role"], "tool");
        assert_eq!(wire[2]["tool_call_id"], "call_1");
        assert_eq!(wire[3]["role"], "tool");
        assert_eq!(wire[3]["tool_call_id"], "call_2");
    }

    #[test]
    fn test_parse_response_with_tool_calls() {
        let client = test_client();
        let api_response = ChatResponse {
            choices: vec![ChatChoice {
                message: ChatMessage {
                    content: None,
                    tool_calls: Some(vec![ChatToolCall {
                        id: "call_9".to_string(),
                        function: ChatFunction {
                            name: "get_weather".to_string(),
                            arguments: r#"{"city":"Manali"}"#.to_string(),
                        },
                    }]),
                },
                finish_reason: Some("tool_calls".to_string()),
            }],
            usage: ChatUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
            },
        };

        let parsed = client.parse_response(api_response);
        assert_eq!(parsed.stop_reason, StopReason::ToolUse);
        assert_eq!(parsed.tool_calls.len(), 1);
        assert_eq!(parsed.tool_calls[0].name, "get_weather");
        assert_eq!(parsed.tool_calls[0].input["city"], "Manali");
        assert_eq!(parsed.usage.total(), 15);
    }
}
