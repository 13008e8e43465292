//! Chat refinement of an existing summary.

use serde_json::Value;
use tracing::debug;

use digest_llm::{ChatOptions, LlmProvider};
use digest_skills::{parse_skill_request, SkillCatalog, SkillRequest};
use digest_types::{clean_response, ChatMessage, ContentType, ExtractedContent, SummaryDocument};

use crate::error::SummarizeError;
use crate::parse::parse_json_object;

/// Interpreted model reply in a refinement conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    /// Conversational answer
    Text(String),
    /// Complete replacement for the current summary
    Updated(SummaryDocument),
    /// The model wants documentation before answering
    SkillsRequested(SkillRequest),
}

/// System prompt describing the summary under discussion.
///
/// With a catalog, the chat form of the skill catalog is appended.
pub fn chat_system_prompt(
    summary: &SummaryDocument,
    content: &ExtractedContent,
    skills: Option<&SkillCatalog>,
) -> Result<String, SummarizeError> {
    let kind = match content.content_type {
        ContentType::Youtube => "YouTube video",
        ContentType::Article | ContentType::Generic => "web page",
    };
    let mut prompt = format!(
        "You are a helpful assistant that helps refine and discuss content summaries.
The user has a summary of a {} titled \"{}\".

Current summary (JSON):
{}

If the user asks to modify the summary, respond with the complete updated JSON summary.
If the user asks a question, respond naturally in text.",
        kind,
        content.title,
        serde_json::to_string_pretty(summary)?
    );

    if let Some(catalog) = skills.filter(|c| !c.is_empty()) {
        prompt.push_str("\n\n");
        prompt.push_str(&catalog.chat_catalog());
    }
    Ok(prompt)
}

/// The refinement system prompt followed by the user's conversation.
pub fn chat_conversation(
    messages: &[ChatMessage],
    summary: &SummaryDocument,
    content: &ExtractedContent,
    skills: Option<&SkillCatalog>,
) -> Result<Vec<ChatMessage>, SummarizeError> {
    let mut conversation = Vec::with_capacity(messages.len() + 1);
    conversation.push(ChatMessage::system(chat_system_prompt(summary, content, skills)?));
    conversation.extend_from_slice(messages);
    Ok(conversation)
}

fn is_complete_document(value: &Value) -> bool {
    let non_empty = |key: &str| value.get(key).and_then(Value::as_str).is_some_and(|s| !s.is_empty());
    non_empty("tldr") && non_empty("summary")
}

/// Classify a chat reply.
///
/// Skill requests win; then a JSON object with non-empty `tldr` and
/// `summary` (directly or under `updates`) replaces the summary; anything
/// else is conversational text.
pub fn interpret_chat_reply(reply: &str) -> ChatReply {
    if let Some(request) = parse_skill_request(reply) {
        return ChatReply::SkillsRequested(request);
    }

    if let Some(value) = parse_json_object(reply) {
        if is_complete_document(&value) {
            return ChatReply::Updated(SummaryDocument::from_value(&value));
        }
        if let Some(updates) = value.get("updates").filter(|u| is_complete_document(u)) {
            return ChatReply::Updated(SummaryDocument::from_value(updates));
        }
        if let Some(text) = value.get("text").and_then(Value::as_str) {
            return ChatReply::Text(text.to_string());
        }
    }

    ChatReply::Text(clean_response(reply))
}

/// Follow-up user turn carrying the documentation for a skill request.
///
/// Returns `None` when none of the requested skills are known.
pub fn skill_documentation_message(
    catalog: &SkillCatalog,
    request: &SkillRequest,
) -> Option<ChatMessage> {
    let documentation = catalog.resolve(&request.skills_needed);
    if documentation.is_empty() {
        return None;
    }
    Some(ChatMessage::user(format!(
        "Here is the documentation you requested.{}\n\nNow respond to my previous message using it.",
        documentation
    )))
}

/// Send one refinement turn and interpret the reply.
pub async fn refine_chat(
    provider: &dyn LlmProvider,
    messages: &[ChatMessage],
    summary: &SummaryDocument,
    content: &ExtractedContent,
    skills: Option<&SkillCatalog>,
) -> Result<ChatReply, SummarizeError> {
    let conversation = chat_conversation(messages, summary, content, skills)?;
    debug!(
        provider = provider.name(),
        turns = messages.len(),
        "Sending chat refinement"
    );

    let response = provider
        .send_chat(&conversation, &ChatOptions::default())
        .await?;
    Ok(interpret_chat_reply(&response))
}
