//! Token-budget chunking.
//!
//! Content that fits the budget is returned whole. Longer content is split
//! greedily on blank-line paragraph boundaries; a paragraph that alone
//! exceeds the budget is split further on sentence boundaries.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::config::ChunkOptions;
use crate::error::SummarizeError;

/// Fixed character-to-token ratio. An approximation, not a tokenizer.
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimated token count of `text`.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\n+").expect("paragraph pattern is valid"))
}

fn sentence_end() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+\s*").expect("sentence pattern is valid"))
}

/// Split `text` into ordered chunks that each fit the available budget.
///
/// Always returns at least one chunk. A single sentence longer than the
/// budget is passed through whole.
pub fn chunk_content(text: &str, options: &ChunkOptions) -> Result<Vec<String>, SummarizeError> {
    let available_tokens = options.available_tokens()?;
    if estimate_tokens(text) <= available_tokens {
        return Ok(vec![text.to_string()]);
    }

    let mut builder = ChunkBuilder::new(available_tokens * CHARS_PER_TOKEN);
    for paragraph in paragraph_break().split(text) {
        builder.add_paragraph(paragraph);
    }
    let chunks = builder.finish();

    debug!(
        chunks = chunks.len(),
        available_tokens,
        estimated_tokens = estimate_tokens(text),
        "Split content into chunks"
    );
    Ok(chunks)
}

/// Sentences of `paragraph`, each keeping its trailing punctuation and
/// whitespace. Text after the last terminator forms a final sentence, so
/// the pieces concatenate back to the paragraph.
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in sentence_end().find_iter(paragraph) {
        sentences.push(&paragraph[start..m.end()]);
        start = m.end();
    }
    if start < paragraph.len() {
        sentences.push(&paragraph[start..]);
    }
    sentences
}

struct ChunkBuilder {
    max_chars: usize,
    chunks: Vec<String>,
    current: String,
    current_chars: usize,
}

impl ChunkBuilder {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            chunks: Vec::new(),
            current: String::new(),
            current_chars: 0,
        }
    }

    fn add_paragraph(&mut self, paragraph: &str) {
        let paragraph_chars = paragraph.chars().count();

        // +2 for the blank line joining paragraphs
        if self.current_chars + paragraph_chars + 2 > self.max_chars {
            self.flush();
        }

        if paragraph_chars > self.max_chars {
            self.flush();
            for sentence in split_sentences(paragraph) {
                let sentence_chars = sentence.chars().count();
                if self.current_chars + sentence_chars > self.max_chars {
                    self.flush();
                }
                self.current.push_str(sentence);
                self.current_chars += sentence_chars;
            }
        } else {
            if self.current_chars > 0 {
                self.current.push_str("\n\n");
                self.current_chars += 2;
            }
            self.current.push_str(paragraph);
            self.current_chars += paragraph_chars;
        }
    }

    /// Close the current chunk. No-op when it is empty.
    fn flush(&mut self) {
        if self.current_chars == 0 {
            return;
        }
        let chunk = self.current.trim();
        if !chunk.is_empty() {
            self.chunks.push(chunk.to_string());
        }
        self.current.clear();
        self.current_chars = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        if self.chunks.is_empty() {
            self.chunks.push(String::new());
        }
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Paragraphs of ~`size` chars made of short sentences.
    fn paragraphs(count: usize, size: usize) -> String {
        (0..count)
            .map(|i| {
                let mut paragraph = String::new();
                while paragraph.len() < size {
                    paragraph.push_str(&format!("Paragraph {} keeps talking about things. ", i));
                }
                paragraph.trim_end().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        // counted in characters, not bytes
        assert_eq!(estimate_tokens("привет"), 2);
    }

    #[test]
    fn test_fitting_content_is_single_chunk() {
        let text = "First paragraph.\n\n\n  Second paragraph with odd spacing.  ";
        let chunks = chunk_content(text, &ChunkOptions::new(8000)).unwrap();
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn test_empty_content_is_single_chunk() {
        let chunks = chunk_content("", &ChunkOptions::new(8000)).unwrap();
        assert_eq!(chunks, vec![String::new()]);
    }

    #[test]
    fn test_large_content_respects_budget() {
        // ~50,000 estimated tokens against 2,000 available
        let text = paragraphs(400, 500);
        assert!(estimate_tokens(&text) >= 50_000);

        let options = ChunkOptions::new(8000);
        let chunks = chunk_content(&text, &options).unwrap();

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 8000);
            assert!(estimate_tokens(chunk) <= 2000);
        }
    }

    #[test]
    fn test_chunks_reconstruct_content() {
        let text = paragraphs(60, 700);
        let chunks = chunk_content(&text, &ChunkOptions::new(6500)).unwrap();

        assert!(chunks.len() > 1);
        assert_eq!(normalized(&chunks.join("\n\n")), normalized(&text));
    }

    #[test]
    fn test_oversized_paragraph_splits_on_sentences() {
        // 1 available token = 4 chars per chunk
        let options = ChunkOptions {
            context_window: 101,
            reserved_for_system_prompt: 100,
            reserved_for_output: 0,
            reserved_for_rolling_context: 0,
        };
        let chunks = chunk_content("Hi. Yo! Ok? end", &options).unwrap();
        assert_eq!(chunks, vec!["Hi.", "Yo!", "Ok?", "end"]);
    }

    #[test]
    fn test_run_on_sentence_passes_through_whole() {
        let options = ChunkOptions::new(6010); // 10 tokens = 40 chars
        let run_on = "word ".repeat(30).trim_end().to_string();
        let text = format!("Short intro.\n\n{}\n\nShort outro.", run_on);

        let chunks = chunk_content(&text, &options).unwrap();
        assert_eq!(chunks, vec!["Short intro.".to_string(), run_on, "Short outro.".to_string()]);
    }

    #[test]
    fn test_trailing_text_without_terminator_is_kept() {
        let options = ChunkOptions::new(6005); // 5 tokens = 20 chars
        let text = "One sentence here. Another one here! and a dangling tail";
        let chunks = chunk_content(text, &options).unwrap();

        assert_eq!(normalized(&chunks.join(" ")), normalized(text));
        assert!(chunks.last().unwrap().ends_with("dangling tail"));
    }

    #[test]
    fn test_paragraphs_are_grouped_greedily() {
        let options = ChunkOptions::new(6005); // 20 chars
        let text = "aaaaaaaa\n\nbbbbbbbb\n\ncccccccc";
        let chunks = chunk_content(text, &options).unwrap();
        assert_eq!(chunks, vec!["aaaaaaaa\n\nbbbbbbbb", "cccccccc"]);
    }

    #[test]
    fn test_exhausted_budget_is_rejected() {
        let err = chunk_content("text", &ChunkOptions::new(4000)).unwrap_err();
        assert!(matches!(err, SummarizeError::InvalidBudget { .. }));
    }
}
