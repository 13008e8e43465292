//! Command implementations for page-digest.
//!
//! Handles:
//! - summarize: chunk, prompt and summarize extracted content
//! - chat: refine or discuss an existing summary
//! - chunk: preview chunk boundaries for a context window
//! - test-connection / providers / skills: inspection helpers

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use digest_llm::{
    create_provider_with_timeout, provider_definition, ChatOptions, LlmProvider, PROVIDER_DEFINITIONS,
};
use digest_skills::{catalog, SkillCatalog, SkillRequest};
use digest_summarizer::{
    chat_conversation, chunk_content, estimate_tokens, refine_chat, skill_documentation_message,
    ChatReply, ChunkOptions, SummarizeError, SummarizeOptions, Summarizer,
};
use digest_types::{
    ChatMessage, DetailLevel, ExtractedContent, ProviderSettings, Settings,
    SummaryDocument,
};

/// Load configuration (defaults -> file -> env) and apply the CLI log level.
pub fn load_settings(config_path: Option<&str>, log_level_override: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    Ok(settings)
}

/// Initialize logging to stderr so stdout stays machine-readable.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Settings for the provider to use, with the model filled in from the
/// catalogue when the configuration names none. Not yet validated.
pub fn resolve_provider_settings(
    settings: &Settings,
    provider_override: Option<&str>,
) -> Result<ProviderSettings> {
    let mut provider = match provider_override {
        Some(id) => settings
            .provider_config(id)
            .with_context(|| format!("Provider '{}' is not configured", id))?,
        None => settings.active_provider_config(),
    };

    if provider.model.trim().is_empty() {
        if let Some(model) = provider_definition(&provider.provider_id)
            .and_then(|d| d.default_models.first())
        {
            debug!(provider = %provider.provider_id, model = model.id, "Using default model");
            provider.model = model.id.to_string();
        }
    }

    Ok(provider)
}

/// Create the provider, failing on configuration errors before any request.
pub fn build_provider(
    settings: &Settings,
    provider_override: Option<&str>,
) -> Result<(ProviderSettings, Box<dyn LlmProvider>)> {
    let provider_settings = resolve_provider_settings(settings, provider_override)?;
    provider_settings.validate()?;
    let provider = create_provider_with_timeout(
        provider_settings.to_provider_config(),
        Duration::from_secs(settings.request_timeout_secs),
    )
    .context("Failed to create provider")?;
    Ok((provider_settings, provider))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Summarize the content in `input` and print the document.
pub async fn summarize(
    settings: &Settings,
    input: &Path,
    instructions: Option<String>,
    detail_level: Option<DetailLevel>,
    language: Option<String>,
    provider_override: Option<&str>,
    allow_explicit: bool,
) -> Result<()> {
    let content: ExtractedContent = read_json(input)?;
    let provider_settings = resolve_provider_settings(settings, provider_override)?;

    let mut options = SummarizeOptions::from_settings(settings);
    if let Some(detail_level) = detail_level {
        options.detail_level = detail_level;
    }
    if let Some(language) = language {
        options.language = language;
    }
    if allow_explicit {
        options.allow_explicit_content = true;
    }
    if let Some(instructions) = instructions {
        options = options.with_user_instructions(instructions);
    }

    let summarizer = Summarizer::from_provider_settings(
        &provider_settings,
        options,
        Duration::from_secs(settings.request_timeout_secs),
    )?;

    info!(title = %content.title, words = content.word_count, "Summarizing");

    match summarizer.summarize(&content).await {
        Ok(document) => print_json(&document),
        Err(SummarizeError::TextResponse(text)) => {
            println!("{}", text);
            bail!("The model replied with text instead of a summary")
        }
        Err(e) => Err(e).context("Summarization failed"),
    }
}

/// Send one chat turn about an existing summary.
pub async fn chat(
    settings: &Settings,
    input: &Path,
    summary: &Path,
    message: String,
    stream: bool,
    with_skills: bool,
    provider_override: Option<&str>,
) -> Result<()> {
    let content: ExtractedContent = read_json(input)?;
    let summary: SummaryDocument = read_json(summary)?;
    let (_, provider) = build_provider(settings, provider_override)?;
    let skills = with_skills.then(catalog);
    let messages = vec![ChatMessage::user(message)];

    if stream {
        let conversation = chat_conversation(&messages, &summary, &content, skills)?;
        return stream_reply(provider.as_ref(), &conversation).await;
    }

    let reply = refine_chat(provider.as_ref(), &messages, &summary, &content, skills).await?;
    let reply = match (reply, skills) {
        (ChatReply::SkillsRequested(request), Some(catalog)) => {
            answer_skill_request(provider.as_ref(), messages, &summary, &content, catalog, request)
                .await?
        }
        (reply, _) => reply,
    };

    match reply {
        ChatReply::Text(text) => println!("{}", text),
        ChatReply::Updated(document) => print_json(&document)?,
        ChatReply::SkillsRequested(request) => {
            println!("Model requested skills: {}", request.skills_needed.join(", "))
        }
    }
    Ok(())
}

/// Resolve the requested documentation and ask again, once.
async fn answer_skill_request(
    provider: &dyn LlmProvider,
    mut messages: Vec<ChatMessage>,
    summary: &SummaryDocument,
    content: &ExtractedContent,
    catalog: &SkillCatalog,
    request: SkillRequest,
) -> Result<ChatReply> {
    let Some(documentation) = skill_documentation_message(catalog, &request) else {
        return Ok(ChatReply::SkillsRequested(request));
    };
    info!(skills = ?request.skills_needed, "Providing requested skill documentation");

    messages.push(ChatMessage::assistant(
        serde_json::json!({ "skillsNeeded": request.skills_needed }).to_string(),
    ));
    messages.push(documentation);
    Ok(refine_chat(provider, &messages, summary, content, Some(catalog)).await?)
}

/// Print deltas as they arrive. Ctrl-C stops reading and drops the stream,
/// which closes the connection.
async fn stream_reply(provider: &dyn LlmProvider, conversation: &[ChatMessage]) -> Result<()> {
    let mut deltas = provider
        .stream_chat(conversation, &ChatOptions::default())
        .await
        .context("Failed to start streaming")?;
    let mut stdout = std::io::stdout();

    loop {
        tokio::select! {
            delta = deltas.next() => match delta {
                Some(delta) => {
                    write!(stdout, "{}", delta?)?;
                    stdout.flush()?;
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, closing stream");
                break;
            }
        }
    }
    writeln!(stdout)?;
    Ok(())
}

/// Content body of `input`: the `content` field of extracted-content JSON,
/// or the whole file as plain text.
fn read_body(input: &Path) -> Result<String> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    Ok(match serde_json::from_str::<ExtractedContent>(&text) {
        Ok(content) => content.content,
        Err(_) => text,
    })
}

/// Print the chunk layout of `input`.
pub fn chunk(settings: &Settings, input: &Path, context_window: Option<u32>) -> Result<()> {
    let body = read_body(input)?;
    let context_window =
        context_window.unwrap_or_else(|| settings.active_provider_config().context_window);
    let options = ChunkOptions::new(context_window);

    let chunks = chunk_content(&body, &options)?;
    println!(
        "{} chunk(s), {} estimated tokens, {} available per chunk",
        chunks.len(),
        estimate_tokens(&body),
        options.available_tokens()?
    );
    for (index, chunk) in chunks.iter().enumerate() {
        println!(
            "  chunk {}: {} tokens, {} chars",
            index + 1,
            estimate_tokens(chunk),
            chunk.chars().count()
        );
    }
    Ok(())
}

pub async fn test_connection(settings: &Settings, provider_override: Option<&str>) -> Result<()> {
    let (_, provider) = build_provider(settings, provider_override)?;
    if provider.test_connection().await {
        println!("Connection to {} ({}) OK", provider.name(), provider.model());
        Ok(())
    } else {
        bail!("Connection to {} ({}) failed", provider.name(), provider.model())
    }
}

pub fn list_providers(settings: &Settings) {
    for definition in PROVIDER_DEFINITIONS {
        let marker = if definition.id == settings.active_provider_id {
            "*"
        } else if settings.provider_configs.contains_key(definition.id) {
            "+"
        } else {
            " "
        };
        println!("{} {:<12} {:<14} {}", marker, definition.id, definition.name, definition.default_endpoint);
        for model in definition.default_models {
            println!("    {:<28} {:>9} tokens", model.id, model.context_window);
        }
    }
}

pub fn list_skills() {
    let catalog = catalog();
    for skill in catalog.skills() {
        println!("{:<28} {}", skill.id, skill.description);
    }
}

pub fn resolve_skills(ids: &[String]) -> Result<()> {
    let documentation = catalog().resolve(ids);
    if documentation.is_empty() {
        bail!("None of the requested skills exist");
    }
    println!("{}", documentation.trim_start());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings_with(provider: ProviderSettings) -> Settings {
        let mut settings = Settings {
            active_provider_id: provider.provider_id.clone(),
            ..Default::default()
        };
        settings
            .provider_configs
            .insert(provider.provider_id.clone(), provider);
        settings
    }

    fn provider_settings(id: &str, key: Option<&str>, model: &str) -> ProviderSettings {
        ProviderSettings {
            provider_id: id.to_string(),
            api_key: key.map(str::to_string),
            model: model.to_string(),
            endpoint: None,
            context_window: 128_000,
        }
    }

    #[test]
    fn test_missing_key_rejected_before_request() {
        let settings = settings_with(provider_settings("anthropic", None, "claude-haiku-4-5-20251001"));
        match build_provider(&settings, None) {
            Err(err) => assert!(err.to_string().contains("API key")),
            Ok(_) => panic!("a missing key must be rejected"),
        }
    }

    #[test]
    fn test_default_model_from_catalogue() {
        let settings = settings_with(provider_settings("deepseek", Some("sk"), ""));
        let provider = resolve_provider_settings(&settings, None).unwrap();
        assert_eq!(provider.model, "deepseek-chat");
    }

    #[test]
    fn test_unconfigured_override_rejected() {
        let settings = Settings::default();
        let err = resolve_provider_settings(&settings, Some("xai")).unwrap_err();
        assert!(err.to_string().contains("'xai' is not configured"));
    }

    #[test]
    fn test_self_hosted_needs_no_key() {
        let settings = settings_with(provider_settings("self-hosted", None, "llama3"));
        let (_, provider) = build_provider(&settings, None).unwrap();
        assert_eq!(provider.name(), "Self-hosted");
        assert_eq!(provider.endpoint(), "http://localhost:11434");
    }

    #[test]
    fn test_read_body_accepts_json_and_text() {
        let mut json = tempfile::NamedTempFile::new().unwrap();
        write!(json, r#"{{"url": "u", "title": "t", "content": "from json"}}"#).unwrap();
        assert_eq!(read_body(json.path()).unwrap(), "from json");

        let mut text = tempfile::NamedTempFile::new().unwrap();
        write!(text, "plain words").unwrap();
        assert_eq!(read_body(text.path()).unwrap(), "plain words");
    }

    #[test]
    fn test_chunk_rejects_exhausted_budget() {
        let mut text = tempfile::NamedTempFile::new().unwrap();
        write!(text, "body").unwrap();
        assert!(chunk(&Settings::default(), text.path(), Some(5000)).is_err());
        assert!(chunk(&Settings::default(), text.path(), Some(8000)).is_ok());
    }

    #[test]
    fn test_resolve_unknown_skills() {
        assert!(resolve_skills(&["nope".to_string()]).is_err());
        assert!(resolve_skills(&["mermaid".to_string()]).is_ok());
    }
}
