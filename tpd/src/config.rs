//! TripDaemon configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main TripDaemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Request rate limiting
    pub limiter: LimiterConfig,

    /// Tool execution settings
    pub tools: ToolsConfig,

    /// Requirement gathering settings
    pub elicitation: ElicitationConfig,

    /// Destination recommendation pipeline settings
    pub recommendation: RecommendationConfig,

    /// Candidate place filtering
    pub dedupe: DedupeConfig,

    /// Session checkpoint storage
    pub store: StoreConfig,

    /// Prompt template overrides
    pub prompts: PromptsConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that required environment variables and value ranges are set
    /// correctly. Call this early in startup to fail fast with clear error
    /// messages.
    pub fn validate(&self) -> Result<()> {
        // Check LLM API key environment variable is set
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }

        // A similarity threshold outside (0, 1] silently disables or
        // over-applies duplicate filtering, so reject it up front.
        if !(self.dedupe.threshold > 0.0 && self.dedupe.threshold <= 1.0) {
            return Err(eyre::eyre!(
                "dedupe.threshold must be in (0, 1], got {}",
                self.dedupe.threshold
            ));
        }

        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .tripdaemon.yml
        let local_config = PathBuf::from(".tripdaemon.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/tripdaemon/tripdaemon.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tripdaemon").join("tripdaemon.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!(
                            "Failed to load config from {}: {}",
                            user_config.display(),
                            e
                        );
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).context(format!(
            "LLM API key not found. Set the {} environment variable.",
            self.api_key_env
        ))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

/// Request rate limiting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    /// Sustained completion requests per second
    #[serde(rename = "requests-per-second")]
    pub requests_per_second: f64,

    /// Requests that may be spent in a burst before throttling kicks in
    pub burst: u32,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 1.0,
            burst: 10,
        }
    }
}

/// Tool execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Per-call tool timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
        }
    }
}

/// Requirement gathering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElicitationConfig {
    /// Validation passes before a gathering run gives up
    #[serde(rename = "max-turns")]
    pub max_turns: u32,
}

impl Default for ElicitationConfig {
    fn default() -> Self {
        Self { max_turns: 8 }
    }
}

/// Destination recommendation pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Sources kept from the research agent's consolidated answer
    #[serde(rename = "max-search-results")]
    pub max_search_results: usize,

    /// Sources whose pages are fetched and parsed; the rest contribute
    /// title metadata only
    #[serde(rename = "max-parsed-pages")]
    pub max_parsed_pages: usize,

    /// Concurrent extraction and investigation branches
    #[serde(rename = "max-concurrent-branches")]
    pub max_concurrent_branches: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            max_search_results: 5,
            max_parsed_pages: 3,
            max_concurrent_branches: 4,
        }
    }
}

/// Candidate place filtering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupeConfig {
    /// Token-sort similarity at or above which two names are duplicates
    pub threshold: f64,

    /// Region names to drop on top of the built-in list
    #[serde(rename = "excluded-regions")]
    pub excluded_regions: Vec<String>,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            excluded_regions: Vec::new(),
        }
    }
}

/// Session checkpoint storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory for session checkpoints
    pub dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/tripdaemon on Linux)
        let dir = dirs::data_dir()
            .map(|d| d.join("tripdaemon").join("sessions"))
            .unwrap_or_else(|| PathBuf::from(".sessions"))
            .to_string_lossy()
            .into_owned();

        Self { dir }
    }
}

/// Prompt template overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory holding `{name}.pmt` files that shadow the embedded prompts
    pub dir: Option<String>,
}
