//! Anthropic Messages API provider.
//!
//! System prompts go in a dedicated `system` field and every request
//! carries a versioned `anthropic-version` header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use digest_types::chat::merged_system_prompt;
use digest_types::{ChatMessage, ChatRole, ImageSource, ProviderConfig};

use crate::error::ProviderError;
use crate::http::{build_client, join_url, send, DEFAULT_TIMEOUT};
use crate::provider::{ChatOptions, LlmProvider, TextStream};
use crate::sse::text_deltas;

pub(crate) const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const DISPLAY_NAME: &str = "Anthropic";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: AnthropicContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum AnthropicContent {
    Text(String),
    Blocks(Vec<AnthropicBlock>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum AnthropicBlock {
    Text { text: String },
    Image { source: AnthropicImageSource },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum AnthropicImageSource {
    Base64 { media_type: String, data: String },
    Url { url: String },
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Provider for Anthropic's Messages API.
pub struct AnthropicProvider {
    client: Client,
    api_key: SecretString,
    model: String,
    endpoint: String,
}

impl AnthropicProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(config: ProviderConfig, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: config
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key: config.api_key,
            model: config.model,
        })
    }

    fn build_request<'a>(
        &'a self,
        messages: &[ChatMessage],
        options: &ChatOptions,
        stream: bool,
    ) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            messages: convert_messages(messages),
            max_tokens: options.max_tokens_or_default(),
            temperature: options.temperature_or_default(),
            system: merged_system_prompt(messages),
            stream,
        }
    }

    async fn post(&self, request: &MessagesRequest<'_>) -> Result<reqwest::Response, ProviderError> {
        let url = join_url(&self.endpoint, "/v1/messages")?;
        let builder = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(request);

        send(builder, DISPLAY_NAME).await
    }
}

/// Drop system turns (they travel in the `system` field) and map images to blocks.
fn convert_messages(messages: &[ChatMessage]) -> Vec<AnthropicMessage> {
    messages
        .iter()
        .filter(|m| m.role != ChatRole::System)
        .map(|m| {
            let role = match m.role {
                ChatRole::Assistant => "assistant",
                _ => "user",
            };
            let content = if m.images.is_empty() {
                AnthropicContent::Text(m.content.clone())
            } else {
                let mut blocks: Vec<AnthropicBlock> = m
                    .images
                    .iter()
                    .map(|image| AnthropicBlock::Image {
                        source: match image {
                            ImageSource::Url { url } => AnthropicImageSource::Url { url: url.clone() },
                            ImageSource::Base64 { base64, mime_type } => AnthropicImageSource::Base64 {
                                media_type: mime_type.clone(),
                                data: base64.clone(),
                            },
                        },
                    })
                    .collect();
                blocks.push(AnthropicBlock::Text {
                    text: m.content.clone(),
                });
                AnthropicContent::Blocks(blocks)
            };
            AnthropicMessage { role, content }
        })
        .collect()
}

/// Map one streaming event to a text delta.
fn stream_delta(data: &str) -> Option<Result<String, ProviderError>> {
    let event: Value = serde_json::from_str(data).ok()?;
    match event.get("type").and_then(Value::as_str)? {
        "content_block_delta" => event
            .pointer("/delta/text")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(|text| Ok(text.to_string())),
        "error" => {
            let message = event
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown stream error");
            Some(Err(ProviderError::Stream(message.to_string())))
        }
        _ => None,
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn id(&self) -> &str {
        "anthropic"
    }

    fn name(&self) -> &str {
        DISPLAY_NAME
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
        debug!(model = %self.model, messages = request.messages.len(), "Calling Anthropic");

        let response = self.post(&request).await?;
        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(body
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .unwrap_or_default())
    }

    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<TextStream, ProviderError> {
        let request = self.build_request(messages, options, true);
        debug!(model = %self.model, "Streaming from Anthropic");

        let response = self.post(&request).await?;
        Ok(text_deltas(DISPLAY_NAME, response.bytes_stream(), stream_delta))
    }
}
