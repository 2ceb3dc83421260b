//! Multimodal chat messages in the OpenAI-style wire shape.

use serde::{Deserialize, Serialize};

use crate::error::{AssistError, AssistResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: MessageContent,
}

/// Plain text, or an ordered list of text and image parts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// An image split into media type and base64 payload, as providers that
/// reject data URLs expect it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub media_type: String,
    pub data: String,
}

impl ChatMessage {
    /// A message with the given role and content.
    pub fn new(role: ChatRole, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// A system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(ChatRole::System, MessageContent::Text(text.into()))
    }

    /// A user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, MessageContent::Text(text.into()))
    }

    /// An assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, MessageContent::Text(text.into()))
    }

    /// A user message carrying a sketch or screenshot alongside text.
    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self::new(
            ChatRole::User,
            MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_url.into(),
                    },
                },
            ]),
        )
    }

    /// All text of the message; parts are joined with newlines and images
    /// are skipped.
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Pull the first system message out of a conversation.
    ///
    /// Returns its text and the remaining messages in order. Later system
    /// messages are dropped.
    pub fn split_system(messages: &[ChatMessage]) -> (Option<String>, Vec<ChatMessage>) {
        let system = messages
            .iter()
            .find(|m| m.role == ChatRole::System)
            .map(ChatMessage::text);
        let rest = messages
            .iter()
            .filter(|m| m.role != ChatRole::System)
            .cloned()
            .collect();
        (system, rest)
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl ImageUrl {
    /// Split a `data:<media type>;base64,<payload>` URL.
    pub fn to_inline(&self) -> AssistResult<InlineImage> {
        let invalid = || AssistError::InvalidDataUrl(truncate(&self.url, 32));
        let rest = self.url.strip_prefix("data:").ok_or_else(invalid)?;
        let (header, data) = rest.split_once(',').ok_or_else(invalid)?;
        let media_type = header.split(';').next().unwrap_or_default();
        if media_type.is_empty() || !header.ends_with(";base64") || data.is_empty() {
            return Err(invalid());
        }
        Ok(InlineImage {
            media_type: media_type.to_string(),
            data: data.to_string(),
        })
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((i, _)) => format!("{}…", &s[..i]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn text_and_parts_wire_shapes() {
        let plain = ChatMessage::user("Draw an approval flow");
        assert_eq!(
            serde_json::to_value(&plain).unwrap(),
            json!({"role": "user", "content": "Draw an approval flow"})
        );

        let multimodal = ChatMessage::user_with_image("From this sketch", "data:image/png;base64,AAAA");
        assert_eq!(
            serde_json::to_value(&multimodal).unwrap(),
            json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": "From this sketch"},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}}
                ]
            })
        );

        let back: ChatMessage = serde_json::from_value(serde_json::to_value(&multimodal).unwrap()).unwrap();
        assert_eq!(back, multimodal);
        assert_eq!(back.text(), "From this sketch");
    }

    #[test]
    fn data_url_splits_into_media_type_and_payload() {
        let image = ImageUrl {
            url: "data:image/jpeg;base64,/9j/4AAQ".into(),
        };
        let inline = image.to_inline().unwrap();
        assert_eq!(inline.media_type, "image/jpeg");
        assert_eq!(inline.data, "/9j/4AAQ");
    }

    #[test]
    fn rejects_non_data_urls() {
        for url in [
            "https://example.com/a.png",
            "data:image/png,raw",
            "data:;base64,AAAA",
            "data:image/png;base64,",
        ] {
            let image = ImageUrl { url: url.into() };
            assert!(matches!(image.to_inline(), Err(AssistError::InvalidDataUrl(_))), "{url}");
        }
    }

    #[test]
    fn split_system_keeps_order() {
        let messages = vec![
            ChatMessage::system("rules"),
            ChatMessage::user("a"),
            ChatMessage::assistant("b"),
            ChatMessage::user("c"),
        ];
        let (system, rest) = ChatMessage::split_system(&messages);
        assert_eq!(system.as_deref(), Some("rules"));
        let texts: Vec<String> = rest.iter().map(ChatMessage::text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);

        let (none, all) = ChatMessage::split_system(&rest);
        assert!(none.is_none());
        assert_eq!(all.len(), 3);
    }
}
