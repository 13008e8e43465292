//! # digest-types
//!
//! Shared domain types for page-digest.
//!
//! This crate defines the data that flows through the summarization core:
//! - Chat messages exchanged with LLM providers
//! - Extracted page content handed over by the extractors
//! - The structured summary document produced by the summarizer
//! - Provider configuration and layered application settings

pub mod chat;
pub mod config;
pub mod content;
pub mod error;
pub mod provider;
pub mod reply;
pub mod summary;

pub use chat::{ChatMessage, ChatRole, ImageSource};
pub use config::{DetailLevel, ProviderSettings, Settings};
pub use content::{ContentType, ExtractedComment, ExtractedContent};
pub use error::DigestError;
pub use provider::ProviderConfig;
pub use reply::clean_response;
pub use summary::{ProsAndCons, SummaryDocument};
