//! Provider error types.

use thiserror::Error;

/// Errors raised while talking to an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("{provider} API error ({status}): {body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },

    /// Network failure or timeout before a response arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The streaming body failed or closed unexpectedly.
    #[error("Stream error: {0}")]
    Stream(String),

    /// Missing key, missing endpoint or an unusable HTTP client.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Successful status but the body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Whether a fresh attempt could succeed.
    ///
    /// Configuration errors are raised before any network call and
    /// would fail identically on every attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProviderError::Config(_))
    }

    /// HTTP status, when the provider returned one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Transport(format!("request timed out: {}", e))
        } else if e.is_builder() {
            ProviderError::Config(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = ProviderError::Http {
            provider: "Anthropic".to_string(),
            status: 500,
            body: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "Anthropic API error (500): overloaded");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::Transport("reset".into()).is_retryable());
        assert!(ProviderError::Stream("closed".into()).is_retryable());
        assert!(!ProviderError::Config("no key".into()).is_retryable());
    }
}
