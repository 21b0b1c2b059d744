//! Chat session use case.
//!
//! Owns the open conversation ([`ChatState`]) and ties the answer stream to
//! chat history storage: every answer is applied to the state through
//! [`ChatAction`]s and, when autosave is on, persisted to the backend.

use crate::config::ChatConfig;
use crate::ports::chat_progress::{ChatProgressNotifier, RecordingProgress};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, EventKind, NoConversationLogger,
};
use crate::ports::rag_backend::{BackendError, RagBackend};
use crate::use_cases::send_query::{
    Completion, SendQueryError, SendQueryInput, SendQueryUseCase,
};
use ragchat_domain::{ChatAction, ChatState, ChatSummary, DomainError, Message, Query};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ChatSessionError {
    #[error(transparent)]
    InvalidQuery(#[from] DomainError),

    #[error(transparent)]
    Query(#[from] SendQueryError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ChatSessionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ChatSessionError::Query(e) if e.is_cancelled())
    }
}

/// Result of a successful [`ChatSession::send`].
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub message: Message,
    pub completion: Completion,
    /// Set when autosave was attempted and failed; the answer is kept
    pub save_error: Option<String>,
}

pub struct ChatSession {
    backend: Arc<dyn RagBackend>,
    send_query: SendQueryUseCase,
    config: ChatConfig,
    state: ChatState,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn RagBackend>, config: ChatConfig) -> Self {
        Self {
            send_query: SendQueryUseCase::new(backend.clone()),
            backend,
            config,
            state: ChatState::new(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.send_query = self
            .send_query
            .with_conversation_logger(logger.clone());
        self.conversation_logger = logger;
        self
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Drop the open conversation and start an unsaved one
    pub fn new_chat(&mut self) {
        debug!("Starting a new chat");
        self.state.apply(ChatAction::NewChat);
    }

    /// Load a stored conversation and make it the open one
    pub async fn open(&mut self, id: &str) -> Result<(), ChatSessionError> {
        let record = self.backend.get_chat(id).await?;
        info!(
            "Opened chat {} ({} messages)",
            record.id,
            record.messages.len()
        );
        self.conversation_logger.log(ConversationEvent::new(
            EventKind::ChatOpened,
            serde_json::json!({ "id": record.id, "title": record.title }),
        ));
        self.state.apply(ChatAction::Loaded(record));
        Ok(())
    }

    /// Send a query in the open conversation and stream its answer.
    ///
    /// On failure or cancellation the partial answer stays in the state and
    /// nothing is persisted.
    pub async fn send(
        &mut self,
        text: &str,
        progress: &dyn ChatProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<ChatReply, ChatSessionError> {
        let query = Query::new(text)?;
        let history = self.state.history(self.config.history_limit);
        self.state
            .apply(ChatAction::UserSubmitted(query.content().to_string()));

        let recorder = RecordingProgress::new(progress);
        let input = SendQueryInput::new(query).with_history(history);
        let result = self.send_query.execute(input, &recorder, cancel).await;

        match result {
            Ok(output) => {
                self.state
                    .apply(ChatAction::ContentUpdated(output.message.content.clone()));
                self.state.apply(match output.completion {
                    Completion::Done => ChatAction::Finished {
                        sources: output.message.sources().to_vec(),
                    },
                    Completion::Closed => ChatAction::Closed,
                });

                let save_error = if self.config.autosave {
                    self.save().await.err().map(|e| e.to_string())
                } else {
                    None
                };

                Ok(ChatReply {
                    message: output.message,
                    completion: output.completion,
                    save_error,
                })
            }
            Err(e) => {
                let partial = recorder.latest_content();
                if !partial.is_empty() {
                    self.state.apply(ChatAction::ContentUpdated(partial));
                }
                self.state.apply(ChatAction::Failed(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Persist the open conversation: create it on first save, update after.
    ///
    /// Returns the chat id.
    pub async fn save(&mut self) -> Result<String, ChatSessionError> {
        match self.state.to_record() {
            Some(record) => {
                if let Err(e) = self.backend.update_chat(&record).await {
                    warn!("Failed to update chat {}: {}", record.id, e);
                    return Err(e.into());
                }
                debug!("Updated chat {}", record.id);
                self.log_saved(&record.id, &record.title, record.messages.len());
                Ok(record.id)
            }
            None => {
                let new_chat = self.state.to_new_chat();
                let record = match self.backend.create_chat(&new_chat).await {
                    Ok(record) => record,
                    Err(e) => {
                        warn!("Failed to create chat: {}", e);
                        return Err(e.into());
                    }
                };
                info!("Saved new chat {} \"{}\"", record.id, record.title);
                self.log_saved(&record.id, &record.title, new_chat.messages.len());
                self.state.apply(ChatAction::Saved {
                    id: record.id.clone(),
                    title: record.title,
                });
                Ok(record.id)
            }
        }
    }

    pub async fn list_chats(&self) -> Result<Vec<ChatSummary>, ChatSessionError> {
        let chats = self.backend.list_chats().await?;
        debug!("Listed {} chats", chats.len());
        Ok(chats)
    }

    /// Delete a stored conversation; deleting the open one resets the state
    pub async fn delete_chat(&mut self, id: &str) -> Result<(), ChatSessionError> {
        self.backend.delete_chat(id).await?;
        info!("Deleted chat {}", id);
        self.conversation_logger.log(ConversationEvent::new(
            EventKind::ChatDeleted,
            serde_json::json!({ "id": id }),
        ));
        if self.state.chat_id() == Some(id) {
            self.state.apply(ChatAction::NewChat);
        }
        Ok(())
    }

    fn log_saved(&self, id: &str, title: &str, messages: usize) {
        self.conversation_logger.log(ConversationEvent::new(
            EventKind::ChatSaved,
            serde_json::json!({ "id": id, "title": title, "messages": messages }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_progress::NoChatProgress;
    use crate::use_cases::fake_backend::{FakeAnswer, FakeBackend};
    use ragchat_domain::{ChatRecord, Role};

    fn session(backend: &Arc<FakeBackend>) -> ChatSession {
        ChatSession::new(backend.clone(), ChatConfig::default())
    }

    async fn send(session: &mut ChatSession, text: &str) -> Result<ChatReply, ChatSessionError> {
        session
            .send(text, &NoChatProgress, &CancellationToken::new())
            .await
    }

    #[tokio::test]
    async fn first_answer_creates_chat_then_updates_it() {
        let backend = Arc::new(FakeBackend::default());
        backend.push_answer(FakeAnswer::chunks(&["data: one\ndata: [DONE]\n"]));
        backend.push_answer(FakeAnswer::chunks(&["data: two\ndata: [DONE]\n"]));
        let mut session = session(&backend);

        let reply = send(&mut session, "first question").await.unwrap();
        assert_eq!(reply.message.content, "one");
        assert!(reply.save_error.is_none());
        assert_eq!(session.state().chat_id(), Some("c1"));
        assert_eq!(session.state().title(), Some("first question"));

        send(&mut session, "second").await.unwrap();
        assert_eq!(backend.chat_count(), 1);
        let stored = backend.chat("c1").unwrap();
        assert_eq!(stored.messages.len(), 4);
        assert_eq!(stored.messages[3].content, "two");
    }

    #[tokio::test]
    async fn history_is_limited_and_excludes_current_query() {
        let backend = Arc::new(FakeBackend::default());
        let mut session =
            ChatSession::new(backend.clone(), ChatConfig::default().with_history_limit(2));

        for q in ["q1", "q2", "q3"] {
            send(&mut session, q).await.unwrap();
        }

        let requests = backend.requests();
        assert!(requests[0].history.is_empty());
        let last = &requests[2];
        assert_eq!(last.query, "q3");
        assert_eq!(last.history.len(), 2);
        assert_eq!(last.history[0].role, Role::User);
        assert_eq!(last.history[0].content, "q2");
    }

    #[tokio::test]
    async fn failed_stream_keeps_partial_and_skips_save() {
        let backend = Arc::new(FakeBackend::default());
        backend.push_answer(FakeAnswer::chunks(&[
            "data: partial\ndata: [ERROR]boom[/ERROR]\n",
        ]));
        let mut session = session(&backend);

        let err = send(&mut session, "q").await.unwrap_err();
        assert!(matches!(err, ChatSessionError::Query(SendQueryError::Backend(_))));
        assert_eq!(session.state().last_error(), Some("boom"));
        assert_eq!(session.state().last_assistant().unwrap().content, "partial");
        assert!(!session.state().is_streaming());
        assert_eq!(backend.chat_count(), 0);
    }

    #[tokio::test]
    async fn save_failure_keeps_the_answer() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail_saves();
        let mut session = session(&backend);

        let reply = send(&mut session, "q").await.unwrap();
        assert!(reply.save_error.is_some());
        assert_eq!(session.state().messages().len(), 2);
        assert!(session.state().chat_id().is_none());
    }

    #[tokio::test]
    async fn autosave_off_never_persists() {
        let backend = Arc::new(FakeBackend::default());
        let mut session =
            ChatSession::new(backend.clone(), ChatConfig::default().with_autosave(false));

        send(&mut session, "q").await.unwrap();
        assert_eq!(backend.chat_count(), 0);
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_sending() {
        let backend = Arc::new(FakeBackend::default());
        let mut session = session(&backend);

        let err = send(&mut session, "   ").await.unwrap_err();
        assert!(matches!(err, ChatSessionError::InvalidQuery(_)));
        assert!(backend.requests().is_empty());
        assert!(session.state().messages().is_empty());
    }

    #[tokio::test]
    async fn open_and_delete_current_chat() {
        let backend = Arc::new(FakeBackend::default());
        backend.insert_chat(ChatRecord {
            id: "c9".into(),
            title: "Stored".into(),
            messages: vec![Message::user("q"), Message::assistant("a")],
            created_at: None,
            updated_at: None,
        });
        let mut session = session(&backend);

        session.open("c9").await.unwrap();
        assert_eq!(session.state().title(), Some("Stored"));
        assert_eq!(session.list_chats().await.unwrap().len(), 1);

        session.delete_chat("c9").await.unwrap();
        assert!(session.state().chat_id().is_none());
        assert!(session.state().messages().is_empty());
    }

    #[tokio::test]
    async fn open_missing_chat_is_not_found() {
        let backend = Arc::new(FakeBackend::default());
        let mut session = session(&backend);

        let err = session.open("nope").await.unwrap_err();
        assert!(matches!(err, ChatSessionError::Backend(e) if e.is_not_found()));
    }
}
