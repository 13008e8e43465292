//! Chat message types exchanged with LLM providers.

use serde::{Deserialize, Serialize};

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System instructions
    System,
    /// User turn
    User,
    /// Model turn
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image attached to a chat message.
///
/// Serialized as either `{"url": ...}` or `{"base64": ..., "mimeType": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    /// Remote image the provider fetches itself
    Url { url: String },
    /// Inline image data
    Base64 {
        base64: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

impl ImageSource {
    /// Render the image as a URL, using a data URI for inline images.
    pub fn to_url(&self) -> String {
        match self {
            ImageSource::Url { url } => url.clone(),
            ImageSource::Base64 { base64, mime_type } => {
                format!("data:{};base64,{}", mime_type, base64)
            }
        }
    }
}

/// A single message in a conversation.
///
/// An ordered list of messages forms the conversation sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageSource>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    /// Attach an image to the message.
    pub fn with_image(mut self, image: ImageSource) -> Self {
        self.images.push(image);
        self
    }
}

/// Join all system messages in order, separated by newlines.
///
/// Returns `None` when the conversation has no system message.
pub fn merged_system_prompt(messages: &[ChatMessage]) -> Option<String> {
    let parts: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == ChatRole::System)
        .map(|m| m.content.as_str())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let msg = ChatMessage::assistant("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_image_source_shapes() {
        let url: ImageSource = serde_json::from_str(r#"{"url":"https://x/y.png"}"#).unwrap();
        assert_eq!(url.to_url(), "https://x/y.png");

        let inline: ImageSource =
            serde_json::from_str(r#"{"base64":"AAAA","mimeType":"image/png"}"#).unwrap();
        assert_eq!(inline.to_url(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_merged_system_prompt() {
        let messages = vec![
            ChatMessage::system("first"),
            ChatMessage::user("question"),
            ChatMessage::system("second"),
        ];
        assert_eq!(
            merged_system_prompt(&messages).as_deref(),
            Some("first\nsecond")
        );
        assert!(merged_system_prompt(&[ChatMessage::user("q")]).is_none());
    }
}
