//! Summarization orchestrator.
//!
//! Content that fits in one chunk is summarized with a single call.
//! Longer content goes through rolling multi-pass summarization: chunks
//! are processed strictly in order and each pass receives the previous
//! pass's raw output as context. Only the final pass is parsed.
//!
//! A failed attempt restarts the whole run after a linearly growing delay.
//! Text responses and configuration errors end the run immediately.

use std::sync::Arc;
use std::time::Duration;

use backoff::backoff::Backoff;
use tracing::{debug, error, info, warn};

use digest_llm::{create_provider_with_timeout, ChatOptions, LlmProvider};
use digest_types::{ChatMessage, ExtractedContent, ProviderSettings, SummaryDocument};

use crate::chunker::chunk_content;
use crate::config::SummarizeOptions;
use crate::error::SummarizeError;
use crate::parse::parse_summary_response;
use crate::prompts::{build_system_prompt, continuation_prompt, summarization_prompt};
use crate::retry::LinearBackoff;

/// Drives summarization of extracted content through one provider.
pub struct Summarizer {
    provider: Arc<dyn LlmProvider>,
    options: SummarizeOptions,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn LlmProvider>, options: SummarizeOptions) -> Self {
        Self { provider, options }
    }

    /// Build a summarizer for stored provider settings.
    ///
    /// A missing key or model fails with [`SummarizeError::Config`] before
    /// any provider is created. The options take the provider's context window.
    pub fn from_provider_settings(
        settings: &ProviderSettings,
        mut options: SummarizeOptions,
        timeout: Duration,
    ) -> Result<Self, SummarizeError> {
        settings.validate()?;
        let provider = create_provider_with_timeout(settings.to_provider_config(), timeout)
            .map_err(|e| SummarizeError::Config(e.to_string()))?;
        options.context_window = settings.context_window;
        Ok(Self::new(Arc::from(provider), options))
    }

    pub fn options(&self) -> &SummarizeOptions {
        &self.options
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Summarize `content` into a structured document.
    ///
    /// The returned document is stamped with the provider's display name
    /// and model.
    pub async fn summarize(
        &self,
        content: &ExtractedContent,
    ) -> Result<SummaryDocument, SummarizeError> {
        if content.content.trim().is_empty() {
            return Err(SummarizeError::EmptyContent);
        }

        let system_prompt = build_system_prompt(&self.options);
        let chunks = chunk_content(&content.content, &self.options.chunk_options())?;

        info!(
            provider = self.provider.name(),
            model = self.provider.model(),
            chunks = chunks.len(),
            "Summarizing content"
        );

        let mut backoff = LinearBackoff::new(self.options.retry_delay, self.options.max_retries);
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Starting summarization attempt");

            let result = if chunks.len() == 1 {
                self.one_shot(content, &system_prompt).await
            } else {
                self.rolling(content, &chunks, &system_prompt).await
            };

            match result {
                Ok(mut document) => {
                    document.llm_provider = Some(self.provider.name().to_string());
                    document.llm_model = Some(self.provider.model().to_string());
                    return Ok(document);
                }
                Err(e) if !e.is_retryable() => {
                    debug!(error = %e, attempt = attempts, "Summarization failed, not retrying");
                    return Err(e);
                }
                Err(e) => match backoff.next_backoff() {
                    Some(duration) => {
                        warn!(
                            error = %e,
                            attempt = attempts,
                            retry_in_ms = duration.as_millis(),
                            "Summarization failed, retrying"
                        );
                        tokio::time::sleep(duration).await;
                    }
                    None => {
                        error!(error = %e, attempts, "Max retries exceeded");
                        return Err(e);
                    }
                },
            }
        }
    }

    async fn one_shot(
        &self,
        content: &ExtractedContent,
        system_prompt: &str,
    ) -> Result<SummaryDocument, SummarizeError> {
        let response = self
            .call(system_prompt, summarization_prompt(content))
            .await?;
        parse_summary_response(&response)
    }

    async fn rolling(
        &self,
        content: &ExtractedContent,
        chunks: &[String],
        system_prompt: &str,
    ) -> Result<SummaryDocument, SummarizeError> {
        let total = chunks.len();
        let mut rolling_summary = String::new();

        for (index, chunk) in chunks.iter().enumerate() {
            let is_last = index + 1 == total;
            debug!(chunk = index + 1, chunks = total, "Summarizing chunk");

            let prompt = if index == 0 {
                summarization_prompt(&content.with_body(chunk, is_last))
            } else {
                continuation_prompt(&rolling_summary, chunk, index, total, &content.comments)
            };

            let response = self.call(system_prompt, prompt).await?;
            if is_last {
                return parse_summary_response(&response);
            }
            rolling_summary = response;
        }

        Err(SummarizeError::EmptyContent)
    }

    async fn call(&self, system_prompt: &str, user_prompt: String) -> Result<String, SummarizeError> {
        let messages = [
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_prompt),
        ];
        let options = ChatOptions::default().with_max_tokens(self.options.max_tokens);
        Ok(self.provider.send_chat(&messages, &options).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use digest_llm::{MockProvider, MockReply, ProviderError};
    use digest_types::{ChatRole, ContentType, ExtractedComment};

    const DOCUMENT: &str = r###"{"tldr": "TL;DR", "keyTakeaways": ["a"], "summary": "## S", "conclusion": "C", "relatedTopics": [], "tags": ["t"], "llmProvider": "spoofed"}"###;

    fn article(body: &str) -> ExtractedContent {
        ExtractedContent::new(ContentType::Article, "https://example.com", "Example", body)
    }

    /// Five ~300 char paragraphs; with a 6,100 token window each becomes its own chunk.
    fn long_article() -> ExtractedContent {
        let body = (1..=5)
            .map(|i| format!("Section {} {}", i, "lorem ipsum ".repeat(24).trim_end()))
            .collect::<Vec<_>>()
            .join("\n\n");
        let mut content = article(&body);
        content.comments = vec![ExtractedComment {
            author: Some("reader".to_string()),
            text: "Great post".to_string(),
            likes: Some(7),
        }];
        content
    }

    fn options(context_window: u32) -> SummarizeOptions {
        SummarizeOptions {
            context_window,
            ..Default::default()
        }
    }

    fn user_prompt(call: &[ChatMessage]) -> &str {
        assert_eq!(call.len(), 2);
        assert_eq!(call[0].role, ChatRole::System);
        assert_eq!(call[1].role, ChatRole::User);
        &call[1].content
    }

    #[tokio::test]
    async fn test_one_shot() {
        let provider = Arc::new(MockProvider::with_replies([MockReply::text(DOCUMENT)]));
        let summarizer = Summarizer::new(provider.clone(), SummarizeOptions::default());

        let document = summarizer.summarize(&article("Short body.")).await.unwrap();

        assert_eq!(document.tldr, "TL;DR");
        assert_eq!(document.llm_provider.as_deref(), Some("Mock"));
        assert_eq!(document.llm_model.as_deref(), Some("mock-model"));

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0][0].content.starts_with("You are an expert content summarizer."));
        assert!(user_prompt(&calls[0]).contains("**Content:**\n\nShort body.\n"));
    }

    #[tokio::test]
    async fn test_rolling_issues_one_call_per_chunk() {
        let content = long_article();
        let chunks = chunk_content(&content.content, &options(6100).chunk_options()).unwrap();
        assert_eq!(chunks.len(), 5);

        // intermediate replies are plain text and must not be parsed
        let provider = Arc::new(MockProvider::with_replies([
            MockReply::text("partial one"),
            MockReply::text("partial two"),
            MockReply::text("partial three"),
            MockReply::text("partial four"),
            MockReply::text(format!("```json\n{}\n```", DOCUMENT)),
        ]));
        let summarizer = Summarizer::new(provider.clone(), options(6100));

        let document = summarizer.summarize(&content).await.unwrap();
        assert_eq!(document.summary, "## S");

        let calls = provider.calls();
        assert_eq!(calls.len(), 5);

        let first = user_prompt(&calls[0]);
        assert!(first.starts_with("Summarize the following article/page."));
        assert!(first.contains("Section 1"));
        assert!(!first.contains("User Comments"));

        let second = user_prompt(&calls[1]);
        assert!(second.contains("**Previous summary context:**\npartial one\n"));
        assert!(second.contains("**Content (part 2 of 5):**"));
        assert!(!second.contains("FINAL"));
        assert!(!second.contains("User Comments"));

        let last = user_prompt(&calls[4]);
        assert!(last.contains("partial four"));
        assert!(last.contains("This is the FINAL portion"));
        assert!(last.contains("**Content (part 5 of 5):**\n\nSection 5"));
        assert!(last.contains("- **reader** (7 likes): Great post"));
    }

    #[tokio::test]
    async fn test_text_response_is_not_retried() {
        let provider = Arc::new(MockProvider::with_replies([MockReply::text(
            "I can't help with that.",
        )]));
        let summarizer = Summarizer::new(provider.clone(), SummarizeOptions::default());

        let err = summarizer.summarize(&article("Body.")).await.unwrap_err();
        assert!(matches!(&err, SummarizeError::TextResponse(t) if t == "I can't help with that."));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_http_failure_retries_with_linear_delay() {
        let provider = Arc::new(MockProvider::with_replies([
            MockReply::http(500, "boom"),
            MockReply::http(500, "boom"),
            MockReply::http(500, "boom"),
        ]));
        let summarizer = Summarizer::new(provider.clone(), SummarizeOptions::default());

        let started = tokio::time::Instant::now();
        let err = summarizer.summarize(&article("Body.")).await.unwrap_err();

        assert_eq!(provider.call_count(), 3);
        // 1s before the second attempt, 2s before the third
        assert_eq!(started.elapsed(), Duration::from_secs(3));
        match err {
            SummarizeError::Provider(e) => assert_eq!(e.status(), Some(500)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_then_success() {
        let provider = Arc::new(MockProvider::with_replies([
            MockReply::http(503, "overloaded"),
            MockReply::text(DOCUMENT),
        ]));
        let summarizer = Summarizer::new(provider.clone(), SummarizeOptions::default());

        let document = summarizer.summarize(&article("Body.")).await.unwrap();
        assert_eq!(document.conclusion, "C");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_restarts_rolling_run() {
        let provider = Arc::new(MockProvider::with_replies([
            MockReply::text("partial one"),
            MockReply::http(500, "boom"),
        ]));
        for _ in 0..4 {
            provider.push(MockReply::text("partial"));
        }
        provider.push(MockReply::text(DOCUMENT));
        let summarizer = Summarizer::new(provider.clone(), options(6100));

        summarizer.summarize(&long_article()).await.unwrap();

        let calls = provider.calls();
        assert_eq!(calls.len(), 7);
        assert!(user_prompt(&calls[2]).starts_with("Summarize the following"));
    }

    #[tokio::test]
    async fn test_config_error_is_not_retried() {
        let provider = Arc::new(MockProvider::with_replies([MockReply::Error(
            ProviderError::Config("endpoint is not configured".to_string()),
        )]));
        let summarizer = Summarizer::new(provider.clone(), SummarizeOptions::default());

        let err = summarizer.summarize(&article("Body.")).await.unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_retries() {
        let provider = Arc::new(MockProvider::with_replies([MockReply::http(502, "bad gateway")]));
        let summarizer = Summarizer::new(
            provider.clone(),
            SummarizeOptions {
                max_retries: 0,
                ..Default::default()
            },
        );

        assert!(summarizer.summarize(&article("Body.")).await.is_err());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_before_any_call() {
        let provider = Arc::new(MockProvider::new());
        let summarizer = Summarizer::new(provider.clone(), SummarizeOptions::default());
        let err = summarizer.summarize(&article("  \n\n ")).await.unwrap_err();
        assert!(matches!(err, SummarizeError::EmptyContent));

        let summarizer = Summarizer::new(provider.clone(), options(6000));
        let err = summarizer.summarize(&article("Body.")).await.unwrap_err();
        assert!(matches!(err, SummarizeError::InvalidBudget { .. }));

        assert_eq!(provider.call_count(), 0);
    }

    fn provider_settings(id: &str, key: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            provider_id: id.to_string(),
            api_key: key.map(str::to_string),
            model: "model-x".to_string(),
            endpoint: None,
            context_window: 16_000,
        }
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = Summarizer::from_provider_settings(
            &provider_settings("anthropic", Some("  ")),
            SummarizeOptions::default(),
            Duration::from_secs(5),
        );
        match result {
            Err(err @ SummarizeError::Config(_)) => {
                assert!(err.to_string().contains("API key"));
                assert!(!err.is_retryable());
            }
            Err(other) => panic!("expected a configuration error, got {other}"),
            Ok(_) => panic!("an empty key must be rejected"),
        }
    }

    #[test]
    fn test_from_provider_settings_uses_context_window() {
        let summarizer = Summarizer::from_provider_settings(
            &provider_settings("self-hosted", None),
            SummarizeOptions::default(),
            Duration::from_secs(5),
        )
        .ok()
        .unwrap();
        assert_eq!(summarizer.options().context_window, 16_000);
        assert_eq!(summarizer.provider().name(), "Self-hosted");
        assert_eq!(summarizer.provider().model(), "model-x");
    }

    #[tokio::test]
    async fn test_system_prompt_carries_options() {
        let provider = Arc::new(MockProvider::with_replies([MockReply::text(DOCUMENT)]));
        let options = SummarizeOptions {
            language: "fr".to_string(),
            allow_explicit_content: true,
            ..Default::default()
        }
        .with_user_instructions("Use bullet points");
        let summarizer = Summarizer::new(provider.clone(), options);

        summarizer.summarize(&article("Body.")).await.unwrap();

        let system = &provider.calls()[0][0].content;
        assert!(system.contains("Respond in French."));
        assert!(system.contains("clinical in tone"));
        assert!(system.ends_with("Additional user instructions: Use bullet points"));
    }
}
