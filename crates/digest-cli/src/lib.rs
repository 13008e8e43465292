//! page-digest library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (summarize, chat, chunk, ...)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, SkillsCommands};
pub use commands::{
    build_provider, chat, chunk, init_logging, list_providers, list_skills, load_settings,
    resolve_provider_settings, resolve_skills, summarize, test_connection,
};
