//! Prompt construction.
//!
//! Every function here is pure: the same inputs always produce the same text.

use std::fmt::Write;

use digest_types::{DetailLevel, ExtractedComment, ExtractedContent};

use crate::config::SummarizeOptions;

/// Comments beyond this count are left out of prompts.
pub const MAX_PROMPT_COMMENTS: usize = 20;

/// Appended to the system prompt when mature material may be summarized.
pub const EXPLICIT_CONTENT_INSTRUCTION: &str = "IMPORTANT: The content may contain mature, explicit, or sensitive topics (medical, psychological, sexual health, etc.). You MUST still summarize it fully and accurately. However, keep the summary professional and clinical in tone — do not reproduce explicit language or graphic details. Focus on the key ideas, arguments, and conclusions.";

const AUTO_LANGUAGE_INSTRUCTION: &str = "Respond in the same language as the source content. If the content is in Russian, respond in Russian. If in English, respond in English. Match the content language exactly.";

const RESPONSE_SCHEMA: &str = r#"You MUST respond with valid JSON matching this exact structure (no markdown code fences, just raw JSON):
{
  "tldr": "A concise 2-4 sentence overview of the entire content.",
  "keyTakeaways": ["Key point 1", "Key point 2", ...],
  "summary": "A detailed summary in markdown format. Use paragraphs, bullet points, and formatting as appropriate.",
  "notableQuotes": ["Direct quote 1", "Direct quote 2", ...],
  "conclusion": "The main conclusion or final thoughts from the content.",
  "prosAndCons": { "pros": ["Pro 1", ...], "cons": ["Con 1", ...] },
  "commentsHighlights": ["Notable comment/discussion point 1", ...],
  "relatedTopics": ["Related topic 1", "Related topic 2", ...],
  "tags": ["tag1", "tag2", ...]
}

Guidelines:
- "notableQuotes" should be actual quotes from the text (if any exist). Use an empty array if none found.
- "prosAndCons" is optional — include it only if the content discusses trade-offs, comparisons, or evaluations. Set to null if not applicable.
- "commentsHighlights" is optional — include it only if user comments/discussion is provided. Set to null if not applicable.
- "relatedTopics" should suggest 3-5 topics someone reading this might also be interested in.
- "tags" should be 3-7 short, lowercase tags relevant to the content.
- For "summary", use markdown formatting: headings (##), bullet points, bold, etc."#;

/// English name of a known language code.
pub fn language_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "zh" => "Chinese",
        "ja" => "Japanese",
        "ko" => "Korean",
        _ => return None,
    };
    Some(name)
}

fn language_instruction(language: &str) -> String {
    if language == "auto" {
        AUTO_LANGUAGE_INSTRUCTION.to_string()
    } else {
        format!("Respond in {}.", language_name(language).unwrap_or(language))
    }
}

fn detail_instruction(detail_level: DetailLevel) -> &'static str {
    match detail_level {
        DetailLevel::Brief => "Keep the summary concise — 2-3 sentences for the TLDR, 3-5 key takeaways, and a short summary paragraph.",
        DetailLevel::Standard => "Provide a balanced summary — 2-3 sentences for the TLDR, 5-7 key takeaways, and a comprehensive but focused summary.",
        DetailLevel::Detailed => "Provide a thorough summary — 3-4 sentences for the TLDR, 7-10 key takeaways, and a detailed, in-depth summary.",
    }
}

/// Base system prompt: role, language, verbosity and the JSON schema.
pub fn system_prompt(detail_level: DetailLevel, language: &str) -> String {
    format!(
        "You are an expert content summarizer. {}\n\n{}\n\n{}",
        language_instruction(language),
        detail_instruction(detail_level),
        RESPONSE_SCHEMA
    )
}

/// System prompt with the content policy and user instructions applied.
pub fn build_system_prompt(options: &SummarizeOptions) -> String {
    let mut prompt = system_prompt(options.detail_level, &options.language);
    if options.allow_explicit_content {
        prompt.push_str("\n\n");
        prompt.push_str(EXPLICIT_CONTENT_INSTRUCTION);
    }
    if let Some(instructions) = options
        .user_instructions
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        let _ = write!(prompt, "\n\nAdditional user instructions: {}", instructions);
    }
    prompt
}

/// Bullet list of up to [`MAX_PROMPT_COMMENTS`] comments with author and likes.
pub fn comments_block(comments: &[ExtractedComment]) -> String {
    let mut block = String::new();
    for comment in comments.iter().take(MAX_PROMPT_COMMENTS) {
        let author = match comment.author.as_deref().filter(|a| !a.is_empty()) {
            Some(author) => format!("**{}**", author),
            None => "Anonymous".to_string(),
        };
        let likes = match comment.likes {
            Some(likes) if likes > 0 => format!(" ({} likes)", likes),
            _ => String::new(),
        };
        let _ = writeln!(block, "- {}{}: {}", author, likes, comment.text);
    }
    block
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// User prompt for one-shot summarization and the first chunk of a
/// multi-pass run: metadata, the body, then comments if any.
pub fn summarization_prompt(content: &ExtractedContent) -> String {
    let mut prompt = format!(
        "Summarize the following {}.\n\n",
        content.content_type.label()
    );

    let _ = writeln!(prompt, "**Title:** {}", content.title);
    if let Some(author) = non_empty(&content.author) {
        let _ = writeln!(prompt, "**Author:** {}", author);
    }
    if let Some(published) = non_empty(&content.publish_date) {
        let _ = writeln!(prompt, "**Published:** {}", published);
    }
    if let Some(duration) = non_empty(&content.duration) {
        let _ = writeln!(prompt, "**Duration:** {}", duration);
    }
    if let Some(views) = non_empty(&content.view_count) {
        let _ = writeln!(prompt, "**Views:** {}", views);
    }
    let _ = write!(prompt, "**Word count:** {}\n\n", content.word_count);

    let _ = writeln!(prompt, "---\n\n**Content:**\n\n{}", content.content);

    if !content.comments.is_empty() {
        prompt.push_str("\n---\n\n**User Comments:**\n\n");
        prompt.push_str(&comments_block(&content.comments));
    }

    prompt
}

/// Wraps the previous pass's output as context for the next chunk.
pub fn rolling_context_prompt(previous_summary: &str) -> String {
    format!(
        "Here is a summary of the previous portion of the content. Use it as context for summarizing the next portion, then produce an updated combined summary.

**Previous summary context:**
{}

---

Now continue summarizing the next portion below. Integrate it with the context above to produce a comprehensive summary.",
        previous_summary
    )
}

pub fn final_chunk_prompt() -> &'static str {
    "This is the FINAL portion of the content. Produce the complete, final structured JSON summary incorporating all previous context and this last section."
}

/// User prompt for chunk `index` (zero-based, > 0) of `total`.
///
/// The final chunk also asks for the terminal JSON document and carries
/// the comments.
pub fn continuation_prompt(
    previous_summary: &str,
    chunk: &str,
    index: usize,
    total: usize,
    comments: &[ExtractedComment],
) -> String {
    let is_last = index + 1 == total;

    let mut prompt = rolling_context_prompt(previous_summary);
    prompt.push_str("\n\n");
    if is_last {
        prompt.push_str(final_chunk_prompt());
        prompt.push_str("\n\n");
    }
    let _ = write!(
        prompt,
        "**Content (part {} of {}):**\n\n{}",
        index + 1,
        total,
        chunk
    );

    if is_last && !comments.is_empty() {
        prompt.push_str("\n\n**User Comments:**\n\n");
        prompt.push_str(&comments_block(comments));
    }
    prompt
}
