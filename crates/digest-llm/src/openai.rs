//! OpenAI-compatible chat completions provider.
//!
//! Shared by every vendor speaking the `/v1/chat/completions` wire format;
//! only the display name and default endpoint differ.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use digest_types::{ChatMessage, ProviderConfig};

use crate::error::ProviderError;
use crate::http::{build_client, join_url, send, DEFAULT_TIMEOUT};
use crate::provider::{ChatOptions, LlmProvider, TextStream};
use crate::sse::text_deltas;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: OpenAiContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum OpenAiContent {
    Text(String),
    Parts(Vec<OpenAiPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAiPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Provider for any OpenAI-compatible endpoint.
pub struct OpenAiCompatibleProvider {
    client: Client,
    id: String,
    name: String,
    api_key: SecretString,
    model: String,
    endpoint: String,
}

impl OpenAiCompatibleProvider {
    /// Create a provider shown as `name`, using `default_endpoint` unless
    /// the config overrides it.
    pub fn new(
        config: ProviderConfig,
        name: impl Into<String>,
        default_endpoint: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        Self::with_timeout(config, name, default_endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        config: ProviderConfig,
        name: impl Into<String>,
        default_endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let endpoint = config.endpoint.unwrap_or_else(|| default_endpoint.into());
        Ok(Self {
            client: build_client(timeout)?,
            id: config.provider_id,
            name: name.into(),
            api_key: config.api_key,
            model: config.model,
            endpoint,
        })
    }

    fn build_request<'a>(
        &'a self,
        messages: &[ChatMessage],
        options: &ChatOptions,
        stream: bool,
    ) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            messages: convert_messages(messages),
            max_tokens: options.max_tokens_or_default(),
            temperature: options.temperature_or_default(),
            stream,
        }
    }

    async fn post(&self, request: &CompletionRequest<'_>) -> Result<reqwest::Response, ProviderError> {
        let url = join_url(&self.endpoint, "/v1/chat/completions")?;
        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request);

        // Self-hosted servers usually run without a key
        let key = self.api_key.expose_secret();
        if !key.is_empty() {
            builder = builder.bearer_auth(key);
        }

        send(builder, &self.name).await
    }
}

fn convert_messages(messages: &[ChatMessage]) -> Vec<OpenAiMessage> {
    messages
        .iter()
        .map(|m| {
            let content = if m.images.is_empty() {
                OpenAiContent::Text(m.content.clone())
            } else {
                let mut parts = vec![OpenAiPart::Text {
                    text: m.content.clone(),
                }];
                parts.extend(m.images.iter().map(|image| OpenAiPart::ImageUrl {
                    image_url: ImageUrl { url: image.to_url() },
                }));
                OpenAiContent::Parts(parts)
            };
            OpenAiMessage {
                role: m.role.as_str(),
                content,
            }
        })
        .collect()
}

fn stream_delta(data: &str) -> Option<Result<String, ProviderError>> {
    if data == "[DONE]" {
        return None;
    }
    let chunk: Value = serde_json::from_str(data).ok()?;
    if let Some(error) = chunk.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown stream error");
        return Some(Err(ProviderError::Stream(message.to_string())));
    }
    chunk
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(|text| Ok(text.to_string()))
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String, ProviderError> {
        let request = self.build_request(messages, options, false);
        debug!(provider = %self.name, model = %self.model, "Calling chat completions");

        let response = self.post(&request).await?;
        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<TextStream, ProviderError> {
        let request = self.build_request(messages, options, true);
        debug!(provider = %self.name, model = %self.model, "Streaming chat completions");

        let response = self.post(&request).await?;
        Ok(text_deltas(&self.name, response.bytes_stream(), stream_delta))
    }
}
