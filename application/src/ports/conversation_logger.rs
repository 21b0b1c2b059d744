//! Port for structured conversation logging.
//!
//! Where `tracing` carries diagnostics, a [`ConversationLogger`] keeps a
//! machine-readable transcript: what was asked, what came back, and which
//! history and knowledge-base changes were made.

use serde_json::Value;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    QuerySent,
    AnswerCompleted,
    AnswerFailed,
    ChatOpened,
    ChatSaved,
    ChatDeleted,
    FilesUploaded,
    FileDeleted,
    VectorStoreCleared,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::QuerySent => "query_sent",
            EventKind::AnswerCompleted => "answer_completed",
            EventKind::AnswerFailed => "answer_failed",
            EventKind::ChatOpened => "chat_opened",
            EventKind::ChatSaved => "chat_saved",
            EventKind::ChatDeleted => "chat_deleted",
            EventKind::FilesUploaded => "files_uploaded",
            EventKind::FileDeleted => "file_deleted",
            EventKind::VectorStoreCleared => "vector_store_cleared",
        }
    }
}

/// One transcript entry: its kind plus event-specific fields
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    pub kind: EventKind,
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self { kind, payload }
    }
}

/// Sink for [`ConversationEvent`]s.
///
/// `log` never fails; implementations deal with their own write errors.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every event
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
