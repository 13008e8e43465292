//! Page Digest
//!
//! Summarize extracted web content with a configurable LLM provider.
//!
//! # Usage
//!
//! ```bash
//! page-digest summarize --input page.json [--detail-level brief] [--language de]
//! page-digest chat --input page.json --summary summary.json --message "Shorter please"
//! page-digest chunk --input page.json --context-window 8000
//! page-digest test-connection
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/page-digest/config.toml)
//! 3. Config file given with --config
//! 4. Environment variables (DIGEST_*)
//! 5. CLI flags

use anyhow::Result;

use digest_cli::{
    chat, chunk, init_logging, list_providers, list_skills, load_settings, resolve_skills,
    summarize, test_connection, Cli, Commands, SkillsCommands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings.log_level)?;

    match cli.command {
        Commands::Summarize {
            input,
            instructions,
            detail_level,
            language,
            provider,
            allow_explicit,
        } => {
            summarize(
                &settings,
                &input,
                instructions,
                detail_level,
                language,
                provider.as_deref(),
                allow_explicit,
            )
            .await?;
        }
        Commands::Chat {
            input,
            summary,
            message,
            stream,
            skills,
            provider,
        } => {
            chat(
                &settings,
                &input,
                &summary,
                message,
                stream,
                skills,
                provider.as_deref(),
            )
            .await?;
        }
        Commands::Chunk {
            input,
            context_window,
        } => {
            chunk(&settings, &input, context_window)?;
        }
        Commands::TestConnection { provider } => {
            test_connection(&settings, provider.as_deref()).await?;
        }
        Commands::Providers => {
            list_providers(&settings);
        }
        Commands::Skills { command } => match command {
            SkillsCommands::List => list_skills(),
            SkillsCommands::Resolve { ids } => resolve_skills(&ids)?,
        },
    }

    Ok(())
}
