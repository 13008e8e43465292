//! Provider configuration handed to the LLM layer.

use secrecy::SecretString;

/// One configured LLM backend.
///
/// Read-only to the summarization core. The API key stays wrapped
/// until it is written into a request header.
#[derive(Debug)]
pub struct ProviderConfig {
    pub provider_id: String,
    pub api_key: SecretString,
    pub model: String,
    /// Overrides the provider's default endpoint when set
    pub endpoint: Option<String>,
    /// Context window in tokens
    pub context_window: u32,
}

impl ProviderConfig {
    pub fn new(
        provider_id: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        context_window: u32,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            api_key: SecretString::from(api_key.into()),
            model: model.into(),
            endpoint: None,
            context_window,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.endpoint = if endpoint.is_empty() {
            None
        } else {
            Some(endpoint)
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_provider_config_builder() {
        let config = ProviderConfig::new("openai", "sk-test", "gpt-4o", 128_000)
            .with_endpoint("http://localhost:8080");
        assert_eq!(config.api_key.expose_secret(), "sk-test");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_empty_endpoint_is_none() {
        let config = ProviderConfig::new("openai", "k", "m", 1).with_endpoint("");
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ProviderConfig::new("openai", "sk-secret", "gpt-4o", 1);
        assert!(!format!("{:?}", config).contains("sk-secret"));
    }
}
