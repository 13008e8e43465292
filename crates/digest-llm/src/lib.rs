//! # digest-llm
//!
//! Provider-agnostic access to chat-completion APIs.
//!
//! Provides:
//! - The [`LlmProvider`] trait (send, stream, connection test)
//! - A direct implementation for Anthropic and Google Gemini
//! - A shared OpenAI-compatible implementation for OpenAI, xAI, DeepSeek,
//!   self-hosted servers and any unrecognized provider id
//! - A static registry that picks the implementation by provider id
//! - A scripted [`MockProvider`] for tests

mod anthropic;
mod error;
mod google;
mod http;
mod mock;
mod openai;
mod provider;
pub mod registry;
mod sse;

pub use anthropic::AnthropicProvider;
pub use error::ProviderError;
pub use google::GoogleProvider;
pub use mock::{MockProvider, MockReply};
pub use openai::OpenAiCompatibleProvider;
pub use provider::{ChatOptions, LlmProvider, TextStream, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
pub use registry::{
    create_provider, create_provider_with_timeout, provider_definition, ModelDefinition,
    ProviderDefinition, PROVIDER_DEFINITIONS,
};
