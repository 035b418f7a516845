//! search_web tool - web search for destination research

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::{Tool, ToolResult};

/// Search the web for information
pub struct SearchWebTool;

/// Configuration for the search API
#[derive(Debug, Clone)]
struct SearchConfig {
    provider: &'static str,
    api_key: String,
}

impl SearchConfig {
    /// Load from environment variables
    fn from_env() -> Option<Self> {
        if let Ok(api_key) = std::env::var("TAVILY_API_KEY") {
            return Some(Self {
                provider: "tavily",
                api_key,
            });
        }

        if let Ok(api_key) = std::env::var("BRAVE_API_KEY") {
            return Some(Self {
                provider: "brave",
                api_key,
            });
        }

        None
    }
}

#[async_trait]
impl Tool for SearchWebTool {
    fn name(&self) -> &'static str {
        "search_web"
    }

    fn description(&self) -> &'static str {
        "Search the web for pages matching a query. Returns the title, url, and domain of each result. \
         Requires TAVILY_API_KEY or BRAVE_API_KEY."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum results to return (default: 5)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let query = match input["query"].as_str() {
            Some(q) => q,
            None => return ToolResult::error("query is required"),
        };

        let max_results = input["max_results"].as_u64().unwrap_or(5) as usize;

        let config = match SearchConfig::from_env() {
            Some(c) => c,
            None => {
                return ToolResult::error(
                    "No search API configured. Set TAVILY_API_KEY or BRAVE_API_KEY environment variable.",
                );
            }
        };

        match config.provider {
            "tavily" => search_tavily(query, max_results, &config.api_key).await,
            _ => search_brave(query, max_results, &config.api_key).await,
        }
    }
}

/// Search using Tavily API
async fn search_tavily(query: &str, max_results: usize, api_key: &str) -> ToolResult {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_default();

    let body = serde_json::json!({
        "api_key": api_key,
        "query": query,
        "max_results": max_results,
        "search_depth": "basic"
    });

    let response = match client.post("https://api.tavily.com/search").json(&body).send().await {
        Ok(r) => r,
        Err(e) => return ToolResult::error(format!("Search request failed: {e}")),
    };

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return ToolResult::error(format!("Tavily API error {status}: {error_text}"));
    }

    let result: Value = match response.json().await {
        Ok(r) => r,
        Err(e) => return ToolResult::error(format!("Failed to parse response: {e}")),
    };

    let Some(results) = result["results"].as_array().filter(|r| !r.is_empty()) else {
        return ToolResult::success("No results found");
    };

    let hits: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let title = r["title"].as_str().unwrap_or("(no title)");
            let url = r["url"].as_str().unwrap_or("");
            let content = r["content"].as_str().unwrap_or("");
            format_hit(i, title, url, content)
        })
        .collect();

    ToolResult::success(format!("Results for search term: {query}\n\n{}", hits.join("\n")))
}

/// Search using Brave Search API
async fn search_brave(query: &str, max_results: usize, api_key: &str) -> ToolResult {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_default();

    let response = match client
        .get("https://api.search.brave.com/res/v1/web/search")
        .header("X-Subscription-Token", api_key)
        .query(&[("q", query), ("count", &max_results.to_string())])
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => return ToolResult::error(format!("Search request failed: {e}")),
    };

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return ToolResult::error(format!("Brave API error {status}: {error_text}"));
    }

    let result: Value = match response.json().await {
        Ok(r) => r,
        Err(e) => return ToolResult::error(format!("Failed to parse response: {e}")),
    };

    let Some(results) = result["web"]["results"].as_array().filter(|r| !r.is_empty()) else {
        return ToolResult::success("No results found");
    };

    let hits: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let title = r["title"].as_str().unwrap_or("(no title)");
            let url = r["url"].as_str().unwrap_or("");
            let description = r["description"].as_str().unwrap_or("");
            format_hit(i, title, url, description)
        })
        .collect();

    ToolResult::success(format!("Results for search term: {query}\n\n{}", hits.join("\n")))
}

fn format_hit(index: usize, title: &str, url: &str, snippet: &str) -> String {
    format!(
        "{}. {}\n   url: {}\n   domain: {}\n   {}\n",
        index + 1,
        title,
        url,
        domain_of(url),
        truncate(snippet, 200)
    )
}

/// Host portion of a URL, or the input when it does not parse
pub fn domain_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// Truncate string to max length
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_missing_query() {
        let tool = SearchWebTool;
        let result = tool.execute(serde_json::json!({})).await;

        assert!(result.is_error);
        assert!(result.content.contains("query is required"));
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://www.tripadvisor.in/goa"), "www.tripadvisor.in");
        assert_eq!(domain_of("not a url"), "not a url");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is a ...");
    }

    #[test]
    fn test_format_hit_carries_url_and_domain() {
        let hit = format_hit(0, "Top places", "https://example.com/places", "snippet");
        assert!(hit.starts_with("1. Top places"));
        assert!(hit.contains("url: https://example.com/places"));
        assert!(hit.contains("domain: example.com"));
    }
}
