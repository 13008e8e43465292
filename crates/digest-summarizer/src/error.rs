//! Error type for summarization.

use thiserror::Error;

use digest_llm::ProviderError;
use digest_types::DigestError;

/// Classified summarization failure.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Raised before any network call; never retried.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Reserved budgets leave no room for content.
    #[error(
        "Context window of {context_window} tokens leaves no room for content after reserving {reserved} tokens"
    )]
    InvalidBudget { context_window: u32, reserved: u32 },

    #[error("No content to summarize")]
    EmptyContent,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport, HTTP or stream failure from the provider.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The model answered with text instead of the JSON document
    /// (refusal or off-schema reply). Carries the cleaned reply verbatim.
    #[error("{0}")]
    TextResponse(String),
}

impl SummarizeError {
    /// Only provider failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            SummarizeError::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<DigestError> for SummarizeError {
    fn from(e: DigestError) -> Self {
        match e {
            DigestError::Config(message) | DigestError::InvalidInput(message) => {
                SummarizeError::Config(message)
            }
            DigestError::Serialization(e) => SummarizeError::Serialization(e),
        }
    }
}
