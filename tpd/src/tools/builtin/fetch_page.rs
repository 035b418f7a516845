//! fetch_page tool - fetch a URL and convert the content to markdown

use async_trait::async_trait;
use html2md::rewrite_html;
use serde_json::Value;

use crate::tools::{Tool, ToolResult};

const MAX_BODY_BYTES: usize = 1_000_000;
const MAX_OUTPUT_CHARS: usize = 50_000;

/// Fetch content from a URL
pub struct FetchPageTool {
    client: reqwest::Client,
}

impl FetchPageTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for FetchPageTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FetchPageTool {
    fn name(&self) -> &'static str {
        "fetch_page"
    }

    fn description(&self) -> &'static str {
        "Fetch content from a URL. Converts HTML pages to markdown."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "URL to fetch"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let url = match input["url"].as_str() {
            Some(u) => u,
            None => return ToolResult::error("url is required"),
        };

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return ToolResult::error("URL must start with http:// or https://");
        }

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Failed to fetch URL: {e}")),
        };

        if !response.status().is_success() {
            return ToolResult::error(format!("HTTP error: {}", response.status()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => return ToolResult::error(format!("Failed to read response: {e}")),
        };

        if body.len() > MAX_BODY_BYTES {
            return ToolResult::error("Response too large (> 1MB)");
        }

        let output = if content_type.contains("text/html") || content_type.contains("application/xhtml") {
            rewrite_html(&body, false)
        } else if content_type.contains("application/json") {
            match serde_json::from_str::<Value>(&body) {
                Ok(json) => serde_json::to_string_pretty(&json).unwrap_or(body),
                Err(_) => body,
            }
        } else {
            body
        };

        ToolResult::success(truncate_chars(&output, MAX_OUTPUT_CHARS))
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...\n[truncated, {} chars total]", head, s.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_missing_url() {
        let tool = FetchPageTool::new();
        let result = tool.execute(serde_json::json!({})).await;

        assert!(result.is_error);
        assert!(result.content.contains("url is required"));
    }

    #[tokio::test]
    async fn test_fetch_invalid_scheme() {
        let tool = FetchPageTool::new();
        let result = tool.execute(serde_json::json!({"url": "ftp://example.com"})).await;

        assert!(result.is_error);
        assert!(result.content.contains("http"));
    }

    #[test]
    fn test_truncate_chars_short_input() {
        assert_eq!(truncate_chars("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_chars_long_input() {
        let long = "x".repeat(100);
        let out = truncate_chars(&long, 10);
        assert!(out.starts_with("xxxxxxxxxx..."));
        assert!(out.contains("100 chars total"));
    }
}
