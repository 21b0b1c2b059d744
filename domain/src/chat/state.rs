//! Conversation state and the reducer that mutates it
//!
//! The UI never edits [`ChatState`] directly. Every change goes through
//! [`ChatState::apply`] with a [`ChatAction`], so the sequence of actions
//! fully describes how a conversation evolved.

use super::entities::{HistoryTurn, Message, Source};
use super::history::{ChatRecord, NewChat, derive_title};

/// Actions understood by the chat reducer
#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    /// Start over with an empty, unsaved conversation
    NewChat,
    /// Replace the conversation with one loaded from the backend
    Loaded(ChatRecord),
    /// The user sent a query; an empty assistant reply is opened for streaming
    UserSubmitted(String),
    /// Full assistant content so far; ignored unless it extends the current reply
    ContentUpdated(String),
    /// Stream finished with `[DONE]`; sources are attached to the reply
    Finished { sources: Vec<Source> },
    /// Stream ended without `[DONE]`; the reply keeps its text, no sources
    Closed,
    /// Stream failed or was cancelled
    Failed(String),
    /// Conversation was persisted under `id`
    Saved { id: String, title: String },
}

/// Explicit state of the open conversation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    chat_id: Option<String>,
    title: Option<String>,
    messages: Vec<Message>,
    streaming: bool,
    last_error: Option<String>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The most recent assistant message, if any
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_assistant())
    }

    /// Apply an action to the state
    pub fn apply(&mut self, action: ChatAction) {
        match action {
            ChatAction::NewChat => {
                *self = Self::default();
            }
            ChatAction::Loaded(record) => {
                self.chat_id = Some(record.id);
                self.title = Some(record.title);
                self.messages = record.messages;
                self.streaming = false;
                self.last_error = None;
            }
            ChatAction::UserSubmitted(query) => {
                self.messages.push(Message::user(query));
                self.messages.push(Message::assistant(String::new()));
                self.streaming = true;
                self.last_error = None;
            }
            ChatAction::ContentUpdated(content) => {
                // Streamed content only grows; anything else is dropped
                if let Some(reply) = self.streaming_reply_mut()
                    && content.starts_with(reply.content.as_str())
                {
                    reply.content = content;
                }
            }
            ChatAction::Finished { sources } => {
                if let Some(reply) = self.streaming_reply_mut() {
                    reply.sources = Some(sources);
                }
                self.streaming = false;
            }
            ChatAction::Closed => {
                self.streaming = false;
            }
            ChatAction::Failed(error) => {
                if self.streaming
                    && self
                        .messages
                        .last()
                        .is_some_and(|m| m.is_assistant() && m.content.is_empty())
                {
                    self.messages.pop();
                }
                self.streaming = false;
                self.last_error = Some(error);
            }
            ChatAction::Saved { id, title } => {
                self.chat_id = Some(id);
                self.title = Some(title);
            }
        }
    }

    /// Prior turns to send as context, excluding the in-flight exchange.
    ///
    /// `limit` keeps only the most recent turns; 0 keeps everything.
    pub fn history(&self, limit: usize) -> Vec<HistoryTurn> {
        let settled = if self.streaming {
            self.messages.len().saturating_sub(2)
        } else {
            self.messages.len()
        };
        let settled = &self.messages[..settled];
        let start = if limit == 0 {
            0
        } else {
            settled.len().saturating_sub(limit)
        };
        settled[start..].iter().map(HistoryTurn::from).collect()
    }

    /// Payload for creating this conversation on the backend
    pub fn to_new_chat(&self) -> NewChat {
        NewChat::from_messages(self.messages.clone())
    }

    /// Full record for updating this conversation, if it has been saved
    pub fn to_record(&self) -> Option<ChatRecord> {
        let id = self.chat_id.clone()?;
        Some(ChatRecord {
            id,
            title: self
                .title
                .clone()
                .unwrap_or_else(|| derive_title(&self.messages)),
            messages: self.messages.clone(),
            created_at: None,
            updated_at: None,
        })
    }

    fn streaming_reply_mut(&mut self) -> Option<&mut Message> {
        if !self.streaming {
            return None;
        }
        self.messages.last_mut().filter(|m| m.is_assistant())
    }
}
