//! Persisted chat history records

use super::entities::{Message, Role};
use crate::core::string::{ellipsize, single_line};
use serde::{Deserialize, Deserializer, Serialize};

/// Maximum title length in bytes before it is ellipsized
pub const MAX_TITLE_LEN: usize = 50;

/// Title used when a chat has no user message yet
pub const DEFAULT_TITLE: &str = "New chat";

/// One entry in the backend's chat list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A full stored conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ChatRecord {
    pub fn summary(&self) -> ChatSummary {
        ChatSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

/// Payload for creating a chat on the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChat {
    pub title: String,
    pub messages: Vec<Message>,
}

impl NewChat {
    /// Build a creation payload, deriving the title from the messages
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            title: derive_title(&messages),
            messages,
        }
    }
}

/// Title for a conversation: its first user message on one line, shortened
pub fn derive_title(messages: &[Message]) -> String {
    messages
        .iter()
        .find(|m| m.role == Role::User && !m.content.trim().is_empty())
        .map(|m| ellipsize(&single_line(&m.content), MAX_TITLE_LEN))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// Backends differ on whether ids are strings or integers; keep them as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
