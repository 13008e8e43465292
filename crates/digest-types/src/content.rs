//! Content handed over by the page extractors.

use serde::{Deserialize, Serialize};

/// Kind of page the content was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Youtube,
    #[default]
    Generic,
}

impl ContentType {
    /// Human-readable label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Youtube => "YouTube video",
            ContentType::Article | ContentType::Generic => "article/page",
        }
    }
}

/// A user comment scraped alongside the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedComment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
}

/// Readable content extracted from a page.
///
/// Immutable input to the summarizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    #[serde(rename = "type", default)]
    pub content_type: ContentType,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Main text content (markdown)
    pub content: String,
    #[serde(default)]
    pub word_count: u64,
    /// Minutes
    #[serde(default)]
    pub estimated_reading_time: u64,

    // YouTube-specific
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<ExtractedComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl ExtractedContent {
    /// Create content with the required fields; word count is derived from the text.
    pub fn new(
        content_type: ContentType,
        url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let word_count = content.split_whitespace().count() as u64;
        Self {
            content_type,
            url: url.into(),
            title: title.into(),
            author: None,
            publish_date: None,
            language: None,
            content,
            word_count,
            estimated_reading_time: word_count.div_ceil(200),
            channel_name: None,
            duration: None,
            view_count: None,
            thumbnail_url: None,
            description: None,
            comments: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Copy of this content with the body replaced and comments optionally dropped.
    pub fn with_body(&self, body: &str, keep_comments: bool) -> Self {
        Self {
            content: body.to_string(),
            comments: if keep_comments {
                self.comments.clone()
            } else {
                Vec::new()
            },
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_extension_payload() {
        let json = r#"{
            "type": "youtube",
            "url": "https://youtube.com/watch?v=1",
            "title": "Rust in 100 seconds",
            "content": "Transcript text",
            "wordCount": 2,
            "viewCount": "1.2M",
            "comments": [{"author": "ann", "text": "great", "likes": 4}]
        }"#;

        let content: ExtractedContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.content_type, ContentType::Youtube);
        assert_eq!(content.view_count.as_deref(), Some("1.2M"));
        assert_eq!(content.comments.len(), 1);
        assert_eq!(content.comments[0].likes, Some(4));
    }

    #[test]
    fn test_new_counts_words() {
        let content = ExtractedContent::new(ContentType::Article, "u", "t", "one two  three");
        assert_eq!(content.word_count, 3);
        assert_eq!(content.estimated_reading_time, 1);
    }

    #[test]
    fn test_with_body_drops_comments() {
        let mut content = ExtractedContent::new(ContentType::Article, "u", "t", "body");
        content.comments.push(ExtractedComment {
            author: None,
            text: "c".to_string(),
            likes: None,
        });

        let part = content.with_body("part", false);
        assert_eq!(part.content, "part");
        assert!(part.comments.is_empty());
        assert_eq!(part.title, "t");
        assert_eq!(content.with_body("x", true).comments.len(), 1);
    }
}
