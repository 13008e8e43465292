//! The provider capability interface.

use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::{self, Stream};
use tracing::debug;

use digest_types::ChatMessage;

use crate::error::ProviderError;

/// Default completion budget when the caller does not set one.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Lazy sequence of text deltas.
///
/// Finite and not restartable. Dropping the stream releases the
/// underlying connection, whether it was exhausted or not.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Per-request generation options.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChatOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl ChatOptions {
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens_or_default(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn temperature_or_default(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

/// Uniform interface over heterogeneous chat-completion APIs.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider identifier, e.g. "anthropic".
    fn id(&self) -> &str;

    /// Display name, e.g. "Anthropic".
    fn name(&self) -> &str;

    /// Model the provider was configured with.
    fn model(&self) -> &str;

    /// Base endpoint requests are sent to (may be empty for unknown vendors).
    fn endpoint(&self) -> &str;

    /// Send a conversation and wait for the complete reply.
    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String, ProviderError>;

    /// Stream the reply as text deltas.
    ///
    /// Providers without native streaming yield the complete reply as a
    /// single delta.
    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<TextStream, ProviderError> {
        let text = self.send_chat(messages, options).await?;
        Ok(Box::pin(stream::once(async move { Ok(text) })))
    }

    /// Check the provider answers at all. Never fails; errors become `false`.
    async fn test_connection(&self) -> bool {
        let messages = [ChatMessage::user("Reply with \"ok\"")];
        let options = ChatOptions::default().with_max_tokens(10);

        match self.send_chat(&messages, &options).await {
            Ok(text) => !text.is_empty(),
            Err(e) => {
                debug!(provider = self.id(), error = %e, "Connection test failed");
                false
            }
        }
    }
}
