//! Google Gemini `generateContent` provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use digest_types::chat::merged_system_prompt;
use digest_types::{ChatMessage, ChatRole, ImageSource, ProviderConfig};

use crate::error::ProviderError;
use crate::http::{build_client, join_url, send, DEFAULT_TIMEOUT};
use crate::provider::{ChatOptions, LlmProvider, TextStream};
use crate::sse::text_deltas;

pub(crate) const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const DISPLAY_NAME: &str = "Google Gemini";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

/// Provider for the Gemini API.
pub struct GoogleProvider {
    client: Client,
    api_key: SecretString,
    model: String,
    endpoint: String,
}

impl GoogleProvider {
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

    async fn post(&self, action: &str, request: &GenerateRequest) -> Result<reqwest::Response, ProviderError> {
        let url = join_url(
            &self.endpoint,
            &format!("/v1beta/models/{}:{}", self.model, action),
        )?;
        let builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(request);

        send(builder, DISPLAY_NAME).await
    }
}

fn build_request(messages: &[ChatMessage], options: &ChatOptions) -> GenerateRequest {
    let contents = messages
        .iter()
        .filter(|m| m.role != ChatRole::System)
        .map(|m| {
            let role = match m.role {
                ChatRole::Assistant => "model",
                _ => "user",
            };
            // Gemini only accepts inline image data; URL images are skipped
            let mut parts: Vec<Part> = m
                .images
                .iter()
                .filter_map(|image| match image {
                    ImageSource::Base64 { base64, mime_type } => Some(Part::Inline {
                        inline_data: InlineData {
                            mime_type: mime_type.clone(),
                            data: base64.clone(),
                        },
                    }),
                    ImageSource::Url { .. } => None,
                })
                .collect();
            parts.push(Part::Text {
                text: m.content.clone(),
            });
            Content {
                role: Some(role),
                parts,
            }
        })
        .collect();

    GenerateRequest {
        contents,
        system_instruction: merged_system_prompt(messages).map(|text| Content {
            role: None,
            parts: vec![Part::Text { text }],
        }),
        generation_config: GenerationConfig {
            max_output_tokens: options.max_tokens_or_default(),
            temperature: options.temperature_or_default(),
        },
    }
}

/// Concatenate the text parts of the first candidate.
fn candidate_text(response: &Value) -> String {
    response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn stream_delta(data: &str) -> Option<Result<String, ProviderError>> {
    let chunk: Value = serde_json::from_str(data).ok()?;
    if let Some(error) = chunk.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown stream error");
        return Some(Err(ProviderError::Stream(message.to_string())));
    }
    let text = candidate_text(&chunk);
    if text.is_empty() {
        None
    } else {
        Some(Ok(text))
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    fn id(&self) -> &str {
        "google"
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
        let request = build_request(messages, options);
        debug!(model = %self.model, "Calling Gemini");

        let response = self.post("generateContent", &request).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(candidate_text(&body))
    }

    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<TextStream, ProviderError> {
        let request = build_request(messages, options);
        debug!(model = %self.model, "Streaming from Gemini");

        let response = self.post("streamGenerateContent?alt=sse", &request).await?;
        Ok(text_deltas(DISPLAY_NAME, response.bytes_stream(), stream_delta))
    }
}
