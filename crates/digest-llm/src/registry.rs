//! Static provider catalogue and implementation selection.
//!
//! Provider selection is a closed set keyed by id. Unrecognized ids are
//! treated as OpenAI-compatible rather than rejected.

use std::time::Duration;

use tracing::debug;

use digest_types::ProviderConfig;

use crate::anthropic::AnthropicProvider;
use crate::error::ProviderError;
use crate::google::GoogleProvider;
use crate::http::DEFAULT_TIMEOUT;
use crate::openai::OpenAiCompatibleProvider;
use crate::provider::LlmProvider;

/// A model offered by default for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDefinition {
    pub id: &'static str,
    pub name: &'static str,
    /// Tokens
    pub context_window: u32,
}

/// A known provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub default_endpoint: &'static str,
    pub default_models: &'static [ModelDefinition],
}

pub const PROVIDER_DEFINITIONS: &[ProviderDefinition] = &[
    ProviderDefinition {
        id: "openai",
        name: "OpenAI",
        default_endpoint: "https://api.openai.com",
        default_models: &[
            ModelDefinition { id: "gpt-4o", name: "GPT-4o", context_window: 128_000 },
            ModelDefinition { id: "gpt-4o-mini", name: "GPT-4o Mini", context_window: 128_000 },
        ],
    },
    ProviderDefinition {
        id: "anthropic",
        name: "Anthropic",
        default_endpoint: crate::anthropic::DEFAULT_ENDPOINT,
        default_models: &[
            ModelDefinition {
                id: "claude-sonnet-4-5-20250929",
                name: "Claude Sonnet 4.5",
                context_window: 200_000,
            },
            ModelDefinition {
                id: "claude-haiku-4-5-20251001",
                name: "Claude Haiku 4.5",
                context_window: 200_000,
            },
        ],
    },
    ProviderDefinition {
        id: "google",
        name: "Google Gemini",
        default_endpoint: crate::google::DEFAULT_ENDPOINT,
        default_models: &[
            ModelDefinition { id: "gemini-2.0-flash", name: "Gemini 2.0 Flash", context_window: 1_000_000 },
            ModelDefinition { id: "gemini-2.0-pro", name: "Gemini 2.0 Pro", context_window: 1_000_000 },
        ],
    },
    ProviderDefinition {
        id: "xai",
        name: "xAI (Grok)",
        default_endpoint: "https://api.x.ai",
        default_models: &[ModelDefinition { id: "grok-2", name: "Grok-2", context_window: 128_000 }],
    },
    ProviderDefinition {
        id: "deepseek",
        name: "DeepSeek",
        default_endpoint: "https://api.deepseek.com",
        default_models: &[
            ModelDefinition { id: "deepseek-chat", name: "DeepSeek Chat", context_window: 64_000 },
            ModelDefinition { id: "deepseek-reasoner", name: "DeepSeek Reasoner", context_window: 64_000 },
        ],
    },
    ProviderDefinition {
        id: "self-hosted",
        name: "Self-hosted",
        default_endpoint: "http://localhost:11434",
        default_models: &[ModelDefinition { id: "custom", name: "Custom Model", context_window: 100_000 }],
    },
];

/// Look up a known provider by id.
pub fn provider_definition(provider_id: &str) -> Option<&'static ProviderDefinition> {
    PROVIDER_DEFINITIONS.iter().find(|d| d.id == provider_id)
}

/// Create the provider implementation for `config.provider_id`.
pub fn create_provider(config: ProviderConfig) -> Result<Box<dyn LlmProvider>, ProviderError> {
    create_provider_with_timeout(config, DEFAULT_TIMEOUT)
}

/// Like [`create_provider`] with an explicit request timeout.
pub fn create_provider_with_timeout(
    config: ProviderConfig,
    timeout: Duration,
) -> Result<Box<dyn LlmProvider>, ProviderError> {
    let definition = provider_definition(&config.provider_id);
    let default_endpoint = definition.map(|d| d.default_endpoint).unwrap_or_default();

    debug!(
        provider = %config.provider_id,
        known = definition.is_some(),
        "Creating provider"
    );

    let provider: Box<dyn LlmProvider> = match (config.provider_id.as_str(), definition) {
        ("anthropic", _) => Box::new(AnthropicProvider::with_timeout(config, timeout)?),
        ("google", _) => Box::new(GoogleProvider::with_timeout(config, timeout)?),
        (_, Some(definition)) => Box::new(OpenAiCompatibleProvider::with_timeout(
            config,
            definition.name,
            default_endpoint,
            timeout,
        )?),
        (_, None) => {
            let name = config.provider_id.clone();
            Box::new(OpenAiCompatibleProvider::with_timeout(
                config,
                name,
                default_endpoint,
                timeout,
            )?)
        }
    };

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(id: &str) -> ProviderConfig {
        ProviderConfig::new(id, "key", "model", 8000)
    }

    #[test]
    fn test_known_providers() {
        let anthropic = create_provider(config("anthropic")).unwrap();
        assert_eq!(anthropic.name(), "Anthropic");
        assert_eq!(anthropic.endpoint(), "https://api.anthropic.com");

        let google = create_provider(config("google")).unwrap();
        assert_eq!(google.id(), "google");

        let xai = create_provider(config("xai")).unwrap();
        assert_eq!(xai.name(), "xAI (Grok)");
        assert_eq!(xai.endpoint(), "https://api.x.ai");

        let hosted = create_provider(config("self-hosted")).unwrap();
        assert_eq!(hosted.endpoint(), "http://localhost:11434");
    }

    #[test]
    fn test_unknown_provider_is_openai_compatible() {
        let provider = create_provider(config("unknown-vendor")).unwrap();
        assert_eq!(provider.id(), "unknown-vendor");
        assert_eq!(provider.name(), "unknown-vendor");
        assert_eq!(provider.endpoint(), "");
    }

    #[test]
    fn test_endpoint_override() {
        let provider =
            create_provider(config("deepseek").with_endpoint("http://proxy.local")).unwrap();
        assert_eq!(provider.name(), "DeepSeek");
        assert_eq!(provider.endpoint(), "http://proxy.local");
    }

    #[test]
    fn test_definitions_have_models() {
        for definition in PROVIDER_DEFINITIONS {
            assert!(!definition.default_models.is_empty(), "{}", definition.id);
        }
        assert!(provider_definition("nope").is_none());
    }
}
