//! Summarization pipeline for page-digest.
//!
//! Provides:
//! - Token-budget chunking along paragraph and sentence boundaries
//! - Prompt construction (detail level, language, content policy, rolling context)
//! - One-shot and rolling multi-pass summarization with linear-backoff retries
//! - Parsing of model output into a [`SummaryDocument`](digest_types::SummaryDocument)
//! - Chat refinement of an existing summary

pub mod chat;
pub mod chunker;
pub mod config;
pub mod error;
pub mod parse;
pub mod prompts;
pub mod retry;
pub mod summarizer;

pub use chat::{
    chat_conversation, chat_system_prompt, interpret_chat_reply, refine_chat,
    skill_documentation_message, ChatReply,
};
pub use chunker::{chunk_content, estimate_tokens, CHARS_PER_TOKEN};
pub use config::{ChunkOptions, SummarizeOptions};
pub use error::SummarizeError;
pub use parse::parse_summary_response;
pub use retry::LinearBackoff;
pub use summarizer::Summarizer;
