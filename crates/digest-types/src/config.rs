//! Configuration loading for page-digest.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/page-digest/config.toml.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::DigestError;
use crate::provider::ProviderConfig;

/// Provider that never needs an API key.
pub const SELF_HOSTED_PROVIDER_ID: &str = "self-hosted";

/// Requested summary verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Brief,
    #[default]
    Standard,
    Detailed,
}

impl FromStr for DetailLevel {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "brief" => Ok(DetailLevel::Brief),
            "standard" => Ok(DetailLevel::Standard),
            "detailed" => Ok(DetailLevel::Detailed),
            other => Err(DigestError::InvalidInput(format!(
                "unknown detail level '{}' (expected brief, standard or detailed)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetailLevel::Brief => write!(f, "brief"),
            DetailLevel::Standard => write!(f, "standard"),
            DetailLevel::Detailed => write!(f, "detailed"),
        }
    }
}

/// Stored settings for one LLM provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider identifier ("openai", "anthropic", "google", ...).
    /// Defaults to the key the settings are stored under.
    #[serde(default)]
    pub provider_id: String,

    /// API key (usually supplied through the environment)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier
    #[serde(default)]
    pub model: String,

    /// Custom endpoint, e.g. for self-hosted servers
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Context window in tokens
    #[serde(default = "default_context_window")]
    pub context_window: u32,
}

fn default_context_window() -> u32 {
    128_000
}

impl ProviderSettings {
    /// Check the settings can be used for a request.
    ///
    /// Every provider except self-hosted requires an API key.
    pub fn validate(&self) -> Result<(), DigestError> {
        let has_key = self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());
        if !has_key && self.provider_id != SELF_HOSTED_PROVIDER_ID {
            return Err(DigestError::config(format!(
                "Please configure your LLM API key for provider '{}'",
                self.provider_id
            )));
        }
        if self.model.trim().is_empty() {
            return Err(DigestError::config(format!(
                "No model configured for provider '{}'",
                self.provider_id
            )));
        }
        if self.context_window == 0 {
            return Err(DigestError::config("context_window must be > 0"));
        }
        Ok(())
    }

    /// Convert into the read-only config consumed by the LLM layer.
    pub fn to_provider_config(&self) -> ProviderConfig {
        let config = ProviderConfig::new(
            self.provider_id.clone(),
            self.api_key.clone().unwrap_or_default(),
            self.model.clone(),
            self.context_window,
        );
        match &self.endpoint {
            Some(endpoint) => config.with_endpoint(endpoint.clone()),
            None => config,
        }
    }
}

fn default_provider_settings() -> ProviderSettings {
    ProviderSettings {
        provider_id: "openai".to_string(),
        api_key: None,
        model: "gpt-4o".to_string(),
        endpoint: None,
        context_window: default_context_window(),
    }
}

fn default_provider_configs() -> BTreeMap<String, ProviderSettings> {
    let mut configs = BTreeMap::new();
    configs.insert("openai".to_string(), default_provider_settings());
    configs
}

fn default_active_provider_id() -> String {
    "openai".to_string()
}

fn default_summary_language() -> String {
    "auto".to_string()
}

fn default_max_retries() -> u32 {
    2
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Configured providers keyed by id
    #[serde(default = "default_provider_configs")]
    pub provider_configs: BTreeMap<String, ProviderSettings>,

    /// Provider used for summarization and chat
    #[serde(default = "default_active_provider_id")]
    pub active_provider_id: String,

    /// Summary language code, or "auto" to mirror the source
    #[serde(default = "default_summary_language")]
    pub summary_language: String,

    #[serde(default)]
    pub summary_detail_level: DetailLevel,

    /// Summarize mature/sensitive material in clinical language instead of refusing
    #[serde(default)]
    pub allow_explicit_content: bool,

    /// Additional attempts after a transient failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// HTTP request timeout for provider calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider_configs: default_provider_configs(),
            active_provider_id: default_active_provider_id(),
            summary_language: default_summary_language(),
            summary_detail_level: DetailLevel::default(),
            allow_explicit_content: false,
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/page-digest/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (DIGEST_*, `__` between nested keys)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, DigestError> {
        let config_dir = ProjectDirs::from("", "", "page-digest")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("active_provider_id", default_active_provider_id())
            .map_err(|e| DigestError::Config(e.to_string()))?
            .set_default("summary_language", default_summary_language())
            .map_err(|e| DigestError::Config(e.to_string()))?
            .set_default("summary_detail_level", DetailLevel::default().to_string())
            .map_err(|e| DigestError::Config(e.to_string()))?
            .set_default("allow_explicit_content", false)
            .map_err(|e| DigestError::Config(e.to_string()))?
            .set_default("max_retries", default_max_retries() as i64)
            .map_err(|e| DigestError::Config(e.to_string()))?
            .set_default("request_timeout_secs", default_request_timeout_secs() as i64)
            .map_err(|e| DigestError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| DigestError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // DIGEST_ACTIVE_PROVIDER_ID, DIGEST_PROVIDER_CONFIGS__OPENAI__API_KEY, ...
        builder = builder.add_source(
            Environment::with_prefix("DIGEST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| DigestError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| DigestError::Config(e.to_string()))
    }

    /// Resolve the active provider.
    ///
    /// Falls back to the first configured provider, then to the built-in
    /// OpenAI entry.
    pub fn active_provider_config(&self) -> ProviderSettings {
        self.provider_config(&self.active_provider_id)
            .or_else(|| {
                self.provider_configs
                    .iter()
                    .next()
                    .map(|(id, provider)| keyed(id, provider))
            })
            .unwrap_or_else(default_provider_settings)
    }

    /// Settings stored for `provider_id`, if any.
    pub fn provider_config(&self, provider_id: &str) -> Option<ProviderSettings> {
        self.provider_configs
            .get(provider_id)
            .map(|provider| keyed(provider_id, provider))
    }
}

fn keyed(id: &str, provider: &ProviderSettings) -> ProviderSettings {
    let mut provider = provider.clone();
    if provider.provider_id.is_empty() {
        provider.provider_id = id.to_string();
    }
    provider
}
