//! search_places tool - geocoding and place lookup via OpenStreetMap

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::tools::{Tool, ToolResult};

// Nominatim usage policy requires an identifying agent string
const USER_AGENT: &str = concat!("tripdaemon/", env!("CARGO_PKG_VERSION"));

/// Look up places by name on OpenStreetMap
pub struct SearchPlacesTool {
    client: reqwest::Client,
}

impl SearchPlacesTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for SearchPlacesTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct PlaceHit {
    display_name: String,
    lat: String,
    lon: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    addresstype: String,
}

#[async_trait]
impl Tool for SearchPlacesTool {
    fn name(&self) -> &'static str {
        "search_places"
    }

    fn description(&self) -> &'static str {
        "Find places by name on OpenStreetMap: resolves a query to matching locations with their \
         full names, types, and coordinates. Useful for geocoding and disambiguating place names."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Place name or free-form location query"
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

        let max_results = input["max_results"].as_u64().unwrap_or(5).min(10).to_string();

        let response = match self
            .client
            .get("https://nominatim.openstreetmap.org/search")
            .query(&[("q", query), ("format", "jsonv2"), ("limit", &max_results)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Place lookup failed: {e}")),
        };

        if !response.status().is_success() {
            return ToolResult::error(format!("Nominatim error: {}", response.status()));
        }

        let hits: Vec<PlaceHit> = match response.json().await {
            Ok(h) => h,
            Err(e) => return ToolResult::error(format!("Failed to parse response: {e}")),
        };

        if hits.is_empty() {
            return ToolResult::success(format!("No places found for '{query}'"));
        }

        let lines: Vec<String> = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| {
                let kind = if hit.kind.is_empty() { &hit.addresstype } else { &hit.kind };
                format!(
                    "{}. {} ({kind})\n   lat: {}, lon: {}",
                    i + 1,
                    hit.display_name,
                    hit.lat,
                    hit.lon
                )
            })
            .collect();

        ToolResult::success(lines.join("\n"))
    }
}
