//! Rate-limited, usage-tracked wrapper around any LLM client
//!
//! Workflows hold an `Arc<dyn LlmClient>` and never know whether throttling is
//! in place. Wrapping the provider client here keeps pacing and accounting out
//! of every call site.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, UsageTracker};
use crate::limiter::RateLimiter;

/// Client decorator that paces requests and records token usage
pub struct Throttled {
    inner: Arc<dyn LlmClient>,
    limiter: Arc<RateLimiter>,
    usage: Arc<UsageTracker>,
}

impl Throttled {
    pub fn new(inner: Arc<dyn LlmClient>, limiter: Arc<RateLimiter>, usage: Arc<UsageTracker>) -> Self {
        Self { inner, limiter, usage }
    }
}

#[async_trait]
impl LlmClient for Throttled {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.limiter.acquire().await;
        debug!("Throttled::complete: token acquired, delegating");

        let response = self.inner.complete(request).await?;
        self.usage.record(&response.usage);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;
    use crate::llm::client::mock::MockLlmClient;

    #[tokio::test]
    async fn test_records_usage_per_call() {
        let mock = Arc::new(MockLlmClient::with_texts(vec!["one", "two"]));
        let limiter = Arc::new(RateLimiter::new(100.0, 10));
        let usage = Arc::new(UsageTracker::new());
        let client = Throttled::new(mock, limiter, Arc::clone(&usage));

        let request = CompletionRequest::text("sys", vec![Message::user("hi")], 100);
        client.complete(request.clone()).await.unwrap();
        client.complete(request).await.unwrap();

        assert_eq!(usage.summary().total_calls, 2);
    }

    #[tokio::test]
    async fn test_error_is_not_recorded() {
        let mock = Arc::new(MockLlmClient::with_texts::<&str>(vec![]));
        let limiter = Arc::new(RateLimiter::new(100.0, 10));
        let usage = Arc::new(UsageTracker::new());
        let client = Throttled::new(mock, limiter, Arc::clone(&usage));

        let request = CompletionRequest::text("sys", vec![Message::user("hi")], 100);
        assert!(client.complete(request).await.is_err());
        assert_eq!(usage.summary().total_calls, 0);
    }
}
