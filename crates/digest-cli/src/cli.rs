//! CLI argument parsing for page-digest.
//!
//! CLI flags override every other configuration source.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use digest_types::DetailLevel;

/// Page Digest
///
/// Summarize extracted page content with a configurable LLM provider.
#[derive(Parser, Debug)]
#[command(name = "page-digest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (in addition to ~/.config/page-digest/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize extracted content and print the summary as JSON
    Summarize {
        /// Extracted content (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Additional instructions appended to the system prompt
        #[arg(long)]
        instructions: Option<String>,

        /// brief, standard or detailed
        #[arg(short, long)]
        detail_level: Option<DetailLevel>,

        /// Summary language code, or "auto"
        #[arg(long)]
        language: Option<String>,

        /// Override the active provider
        #[arg(short, long)]
        provider: Option<String>,

        /// Summarize mature or sensitive material in clinical language
        #[arg(long)]
        allow_explicit: bool,
    },

    /// Ask a follow-up question about a summary, or request changes to it
    Chat {
        /// Extracted content (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Current summary (JSON)
        #[arg(short, long)]
        summary: PathBuf,

        /// Message to send
        #[arg(short, long)]
        message: String,

        /// Print the reply as it is generated
        #[arg(long)]
        stream: bool,

        /// Offer the skill catalog and answer one documentation request
        #[arg(long)]
        skills: bool,

        /// Override the active provider
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Show how content would be split into chunks
    Chunk {
        /// Extracted content (JSON) or plain text
        #[arg(short, long)]
        input: PathBuf,

        /// Override the active provider's context window (tokens)
        #[arg(long)]
        context_window: Option<u32>,
    },

    /// Check that the configured provider answers
    TestConnection {
        /// Override the active provider
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// List known providers and their default models
    Providers,

    /// Inspect the skill catalog
    Skills {
        #[command(subcommand)]
        command: SkillsCommands,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SkillsCommands {
    /// List available skills
    List,

    /// Print the documentation for the given skill ids
    Resolve {
        /// Skill ids, e.g. mermaid mermaid:flowchart
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_summarize() {
        let cli = Cli::parse_from([
            "page-digest",
            "summarize",
            "--input",
            "page.json",
            "--detail-level",
            "Detailed",
            "--language",
            "de",
            "--instructions",
            "Focus on numbers",
        ]);
        match cli.command {
            Commands::Summarize {
                input,
                detail_level,
                language,
                instructions,
                provider,
                allow_explicit,
            } => {
                assert_eq!(input, PathBuf::from("page.json"));
                assert_eq!(detail_level, Some(DetailLevel::Detailed));
                assert_eq!(language.as_deref(), Some("de"));
                assert_eq!(instructions.as_deref(), Some("Focus on numbers"));
                assert!(provider.is_none());
                assert!(!allow_explicit);
            }
            _ => panic!("Expected Summarize command"),
        }
    }

    #[test]
    fn test_cli_invalid_detail_level() {
        let result = Cli::try_parse_from([
            "page-digest",
            "summarize",
            "-i",
            "page.json",
            "-d",
            "verbose",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_chat() {
        let cli = Cli::parse_from([
            "page-digest",
            "chat",
            "-i",
            "page.json",
            "-s",
            "summary.json",
            "-m",
            "Make it shorter",
            "--stream",
        ]);
        match cli.command {
            Commands::Chat {
                message,
                stream,
                skills,
                ..
            } => {
                assert_eq!(message, "Make it shorter");
                assert!(stream);
                assert!(!skills);
            }
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_cli_chunk() {
        let cli = Cli::parse_from([
            "page-digest",
            "chunk",
            "--input",
            "notes.txt",
            "--context-window",
            "8000",
        ]);
        match cli.command {
            Commands::Chunk { context_window, .. } => assert_eq!(context_window, Some(8000)),
            _ => panic!("Expected Chunk command"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "page-digest",
            "test-connection",
            "--config",
            "/tmp/digest.toml",
            "--log-level",
            "debug",
            "--provider",
            "anthropic",
        ]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/digest.toml"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::TestConnection { provider } => {
                assert_eq!(provider.as_deref(), Some("anthropic"))
            }
            _ => panic!("Expected TestConnection command"),
        }
    }

    #[test]
    fn test_cli_skills_resolve() {
        let cli = Cli::parse_from(["page-digest", "skills", "resolve", "mermaid", "mermaid:pie"]);
        match cli.command {
            Commands::Skills {
                command: SkillsCommands::Resolve { ids },
            } => assert_eq!(ids, vec!["mermaid", "mermaid:pie"]),
            _ => panic!("Expected Skills Resolve command"),
        }
    }

    #[test]
    fn test_cli_skills_resolve_requires_ids() {
        assert!(Cli::try_parse_from(["page-digest", "skills", "resolve"]).is_err());
    }
}
