//! Capability classification for the travel toolkit
//!
//! Workflows do not hard-code tool names. At startup one LLM call sorts the
//! registered tools into capability buckets, and each workflow then asks for
//! the buckets it needs. Names the model invents are dropped so the buckets
//! only ever hold tools the executor can actually run.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::llm::{CompletionRequest, LlmClient, Message, parse_json};
use crate::prompts::PromptLoader;
use crate::tools::ToolExecutor;

/// Tool capability buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Web,
    Weather,
    Map,
    HotelStays,
}

impl Capability {
    pub const ALL: [Capability; 4] = [Self::Web, Self::Weather, Self::Map, Self::HotelStays];

    /// Bucket key used in classification prompts and responses
    pub fn key(&self) -> &'static str {
        match self {
            Self::Web => "web_tools",
            Self::Weather => "weather_tools",
            Self::Map => "map_tools",
            Self::HotelStays => "hotel_stays_tools",
        }
    }

    /// What belongs in this bucket, phrased for the classification prompt
    pub fn description(&self) -> &'static str {
        match self {
            Self::Web => {
                "List containing names of the tools which could be useful for online/web activities \
                 and research. This includes tools like web search tools, web crawling and scraping tools, etc."
            }
            Self::Weather => {
                "List containing names of the tools which can help assimilate weather related information \
                 like air quality, minimum and maximum temperatures, weather forecast, wind speeds, \
                 precipitation, and historical weather data."
            }
            Self::Map => {
                "List containing names of the tools which can help in mapping activities. The activities \
                 include, but are not limited to, finding distance between places, geocoding and \
                 reverse-geocoding, routing between cities/markers, geographical area details like \
                 amenities, nearby amenities and public infrastructure details."
            }
            Self::HotelStays => {
                "List containing names of the tools which can search properties available for guest stays, \
                 find details about specific hotels or homestays like AirBnbs. Also, these tools can help \
                 in researching about hotels for guest reviews based on guest experiences."
            }
        }
    }
}

/// Which tools ended up in which capability bucket
#[derive(Debug, Clone, Default)]
pub struct CapabilityMap {
    buckets: HashMap<Capability, Vec<String>>,
}

impl CapabilityMap {
    pub fn insert(&mut self, capability: Capability, tools: Vec<String>) {
        self.buckets.insert(capability, tools);
    }

    /// Tool names in one bucket
    pub fn get(&self, capability: Capability) -> &[String] {
        self.buckets.get(&capability).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tool names across several buckets, deduplicated in first-seen order
    pub fn tools_for(&self, capabilities: &[Capability]) -> Vec<String> {
        let mut seen = Vec::new();
        for cap in capabilities {
            for name in self.get(*cap) {
                if !seen.contains(name) {
                    seen.push(name.clone());
                }
            }
        }
        seen
    }

    /// True when every bucket is empty
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }
}

#[derive(Debug, Deserialize)]
struct ClassificationResponse {
    #[serde(default)]
    web_tools: Vec<String>,
    #[serde(default)]
    weather_tools: Vec<String>,
    #[serde(default)]
    map_tools: Vec<String>,
    #[serde(default)]
    hotel_stays_tools: Vec<String>,
}

/// Classifies registered tools into capability buckets with one LLM call
pub struct ToolClassifier {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
}

impl ToolClassifier {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>) -> Self {
        Self { llm, prompts }
    }

    /// Classify every tool the executor knows about
    ///
    /// An empty map is a valid outcome; workflows that need a bucket handle
    /// getting no tools from it.
    pub async fn classify(&self, executor: &ToolExecutor) -> eyre::Result<CapabilityMap> {
        debug!("ToolClassifier::classify: called");
        let definitions = executor.definitions();

        let tools_listing = definitions
            .iter()
            .map(|d| {
                // Long MCP-style descriptions carry an Args: section the
                // classifier does not need
                let short = d.description.split("Args:\n").next().unwrap_or(&d.description).trim();
                format!("- {}: {}", d.name, short)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let tool_classes = Capability::ALL
            .iter()
            .map(|c| format!("- {}", c.key()))
            .collect::<Vec<_>>()
            .join("\n");

        let mut structure = serde_json::Map::new();
        for cap in Capability::ALL {
            structure.insert(
                cap.key().to_string(),
                serde_json::Value::String(format!("{} Consider [] if not provided", cap.description())),
            );
        }

        let system_prompt = self.prompts.render(
            "tool-classification",
            &serde_json::json!({
                "tool_classes": tool_classes,
                "tools": tools_listing,
                "structure": serde_json::to_string_pretty(&structure)?,
            }),
        )?;

        let request = CompletionRequest::json(
            system_prompt,
            vec![Message::user("Classify the tools listed in the instructions.")],
            1024,
        );

        let response = self.llm.complete(request).await?;
        let content = response
            .content
            .ok_or_else(|| eyre::eyre!("Tool classification returned no content"))?;
        let parsed: ClassificationResponse = parse_json(&content)?;

        let mut map = CapabilityMap::default();
        for (capability, names) in [
            (Capability::Web, parsed.web_tools),
            (Capability::Weather, parsed.weather_tools),
            (Capability::Map, parsed.map_tools),
            (Capability::HotelStays, parsed.hotel_stays_tools),
        ] {
            let (known, unknown): (Vec<String>, Vec<String>) =
                names.into_iter().partition(|name| executor.has_tool(name));
            if !unknown.is_empty() {
                warn!(bucket = capability.key(), ?unknown, "classify: dropping unknown tool names");
            }
            map.insert(capability, known);
        }

        debug!(empty = map.is_empty(), "ToolClassifier::classify: finished");
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::tools::{Tool, ToolResult};
    use async_trait::async_trait;
    use serde_json::Value;

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &'static str {
            self.0
        }

        fn description(&self) -> &'static str {
            "A tool. Args:\n    query: the query"
        }

        fn input_schema(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _input: Value) -> ToolResult {
            ToolResult::success("ok")
        }
    }

    fn executor_with(names: &[&'static str]) -> ToolExecutor {
        let mut executor = ToolExecutor::empty();
        for name in names {
            executor.add_tool(Box::new(NamedTool(name)));
        }
        executor
    }

    #[tokio::test]
    async fn test_classify_filters_unknown_names() {
        let executor = executor_with(&["search_web", "get_weather"]);
        let mock = Arc::new(MockLlmClient::with_texts(vec![
            r#"{"web_tools": ["search_web", "invented_tool"], "weather_tools": ["get_weather"], "map_tools": [], "hotel_stays_tools": []}"#,
        ]));
        let classifier = ToolClassifier::new(mock, Arc::new(PromptLoader::embedded_only()));

        let map = classifier.classify(&executor).await.unwrap();

        assert_eq!(map.get(Capability::Web), ["search_web"]);
        assert_eq!(map.get(Capability::Weather), ["get_weather"]);
        assert!(map.get(Capability::Map).is_empty());
    }

    #[tokio::test]
    async fn test_classify_empty_map_is_valid() {
        let executor = executor_with(&["search_web"]);
        let mock = Arc::new(MockLlmClient::with_texts(vec![r#"{}"#]));
        let classifier = ToolClassifier::new(mock, Arc::new(PromptLoader::embedded_only()));

        let map = classifier.classify(&executor).await.unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_tools_for_dedup_preserves_order() {
        let mut map = CapabilityMap::default();
        map.insert(Capability::Web, vec!["search_web".into(), "fetch_page".into()]);
        map.insert(Capability::Map, vec!["search_places".into(), "search_web".into()]);

        let tools = map.tools_for(&[Capability::Web, Capability::Map]);
        assert_eq!(tools, ["search_web", "fetch_page", "search_places"]);
    }
}
