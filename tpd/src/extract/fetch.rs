//! Page fetching for the extraction fan-out
//!
//! Investigation quality improves a lot when extraction sees page bodies
//! instead of bare titles, but fetching every hit is slow and expensive, so
//! the pipeline only parses the first few results and falls back to
//! title-only extraction for the rest.

use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("tripdaemon/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(reqwest::StatusCode),
}

/// Downloads a page and reduces it to markdown-ish text for extraction.
pub struct PageFetcher {
    client: reqwest::Client,
    max_chars: usize,
}

impl PageFetcher {
    pub fn new(max_chars: usize) -> Self {
        debug!(max_chars, "PageFetcher::new: called");
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client, max_chars }
    }

    pub async fn fetch_markdown(&self, url: &str) -> Result<String, FetchError> {
        let parsed =
            reqwest::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let response = self.client.get(parsed).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let html_body = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("text/html"));
        let body = response.text().await?;

        let text = if html_body { html2md::rewrite_html(&body, false) } else { body };
        Ok(truncated(&text, self.max_chars))
    }
}

fn truncated(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.trim().to_string();
    }
    let cut: String = s.chars().take(max_chars).collect();
    format!("{}\n[truncated]", cut.trim_end())
}
