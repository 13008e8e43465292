//! Scripted provider for testing.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use futures::stream;

use digest_types::ChatMessage;

use crate::error::ProviderError;
use crate::provider::{ChatOptions, LlmProvider, TextStream};

/// One scripted outcome of a provider call.
#[derive(Debug)]
pub enum MockReply {
    Text(String),
    Error(ProviderError),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    /// An HTTP failure with the given status.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        MockReply::Error(ProviderError::Http {
            provider: "Mock".to_string(),
            status,
            body: body.into(),
        })
    }
}

/// Provider that replays queued replies and records every conversation it receives.
///
/// Useful for testing without making API calls.
pub struct MockProvider {
    model: String,
    replies: Mutex<VecDeque<MockReply>>,
    fallback: Option<String>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            replies: Mutex::new(VecDeque::new()),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create with replies returned in order, one per call.
    pub fn with_replies(replies: impl IntoIterator<Item = MockReply>) -> Self {
        let provider = Self::new();
        lock(&provider.replies).extend(replies);
        provider
    }

    /// Reply used once the scripted replies run out.
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    pub fn push(&self, reply: MockReply) {
        lock(&self.replies).push_back(reply);
    }

    /// Conversations received so far, in call order.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> &str {
        ""
    }

    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        _options: &ChatOptions,
    ) -> Result<String, ProviderError> {
        lock(&self.calls).push(messages.to_vec());

        match lock(&self.replies).pop_front() {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Error(e)) => Err(e),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| ProviderError::Transport("no scripted reply left".to_string())),
        }
    }

    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<TextStream, ProviderError> {
        let text = self.send_chat(messages, options).await?;
        let deltas: Vec<Result<String, ProviderError>> = text
            .split_inclusive(' ')
            .map(|word| Ok(word.to_string()))
            .collect();
        Ok(Box::pin(stream::iter(deltas)))
    }
}
