//! Configuration for chunking and summarization.

use std::time::Duration;

use digest_types::{DetailLevel, Settings};

use crate::error::SummarizeError;

/// Token budget used to split content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOptions {
    /// Model context window (tokens)
    pub context_window: u32,
    pub reserved_for_system_prompt: u32,
    pub reserved_for_output: u32,
    pub reserved_for_rolling_context: u32,
}

impl ChunkOptions {
    /// Default reservations: 1000 system + 3000 output + 2000 rolling context.
    pub fn new(context_window: u32) -> Self {
        Self {
            context_window,
            reserved_for_system_prompt: 1000,
            reserved_for_output: 3000,
            reserved_for_rolling_context: 2000,
        }
    }

    pub fn reserved(&self) -> u32 {
        self.reserved_for_system_prompt
            .saturating_add(self.reserved_for_output)
            .saturating_add(self.reserved_for_rolling_context)
    }

    /// Tokens left for content in each chunk.
    ///
    /// Fails when the reservations consume the whole window.
    pub fn available_tokens(&self) -> Result<usize, SummarizeError> {
        let reserved = self.reserved();
        if reserved >= self.context_window {
            return Err(SummarizeError::InvalidBudget {
                context_window: self.context_window,
                reserved,
            });
        }
        Ok((self.context_window - reserved) as usize)
    }
}

/// Options for one summarization request.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizeOptions {
    pub detail_level: DetailLevel,
    /// ISO code or "auto"
    pub language: String,
    /// Model context window (tokens)
    pub context_window: u32,
    /// Additional attempts after a transient failure
    pub max_retries: u32,
    /// Free-form instructions appended to the system prompt
    pub user_instructions: Option<String>,
    pub allow_explicit_content: bool,
    /// Completion budget per provider call
    pub max_tokens: u32,
    /// Delay unit of the linear backoff (attempt k waits k units)
    pub retry_delay: Duration,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            detail_level: DetailLevel::Standard,
            language: "auto".to_string(),
            context_window: 128_000,
            max_retries: 2,
            user_instructions: None,
            allow_explicit_content: false,
            max_tokens: 4096,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl SummarizeOptions {
    /// Options taken from the user's settings and the active provider.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            detail_level: settings.summary_detail_level,
            language: settings.summary_language.clone(),
            context_window: settings.active_provider_config().context_window,
            max_retries: settings.max_retries,
            allow_explicit_content: settings.allow_explicit_content,
            ..Default::default()
        }
    }

    pub fn with_user_instructions(mut self, instructions: impl Into<String>) -> Self {
        let instructions = instructions.into();
        self.user_instructions = if instructions.trim().is_empty() {
            None
        } else {
            Some(instructions)
        };
        self
    }

    pub fn chunk_options(&self) -> ChunkOptions {
        ChunkOptions::new(self.context_window)
    }
}
