//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent
///
/// The workflows treat the model as an opaque function: prompt messages in,
/// text or tool calls out. Conversation state lives in the session
/// checkpoint, never in the client.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::llm::{StopReason, TokenUsage};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock LLM client for unit tests - returns scripted responses in order
    /// and records the requests it saw.
    pub struct MockLlmClient {
        responses: Vec<CompletionResponse>,
        call_count: AtomicUsize,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockLlmClient {
        pub fn new(responses: Vec<CompletionResponse>) -> Self {
            Self {
                responses,
                call_count: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Shorthand for a script of plain text replies
        pub fn with_texts<T: Into<String>>(texts: Vec<T>) -> Self {
            Self::new(texts.into_iter().map(text_response).collect())
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Requests seen so far, in call order
        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            self.requests.lock().unwrap().push(request);
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(idx)
                .cloned()
                .ok_or_else(|| LlmError::InvalidResponse("No more mock responses".to_string()))
        }
    }

    /// Build a plain text end-turn response
    pub fn text_response(text: impl Into<String>) -> CompletionResponse {
        CompletionResponse {
            content: Some(text.into()),
            tool_calls: vec![],
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    /// Build a tool-use response with one call
    pub fn tool_call_response(id: &str, name: &str, input: serde_json::Value) -> CompletionResponse {
        CompletionResponse {
            content: None,
            tool_calls: vec![crate::llm::ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                input,
            }],
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_client_returns_responses_in_order() {
            let client = MockLlmClient::with_texts(vec!["Response 1", "Response 2"]);

            let req = CompletionRequest::text("Test", vec![], 1000);

            let resp1 = client.complete(req.clone()).await.unwrap();
            assert_eq!(resp1.content, Some("Response 1".to_string()));

            let resp2 = client.complete(req.clone()).await.unwrap();
            assert_eq!(resp2.content, Some("Response 2".to_string()));

            assert_eq!(client.call_count(), 2);
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::new(vec![]);

            let result = client.complete(CompletionRequest::text("Test", vec![], 1000)).await;
            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_mock_client_records_requests() {
            let client = MockLlmClient::with_texts(vec!["ok"]);

            let req = CompletionRequest::text("System", vec![crate::llm::Message::user("hi")], 500);
            client.complete(req).await.unwrap();

            let seen = client.requests();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].system_prompt, "System");
            assert_eq!(seen[0].messages.len(), 1);
        }
    }
}
