//! Application layer for rag-chat
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ChatConfig, DEFAULT_HISTORY_LIMIT};
pub use ports::{
    chat_progress::{ChatProgressNotifier, NoChatProgress, RecordingProgress},
    conversation_logger::{
        ConversationEvent, ConversationLogger, EventKind, NoConversationLogger,
    },
    rag_backend::{AnswerStream, BackendError, QueryRequest, RagBackend},
    upload_source::{UploadSource, UploadSourceError},
};
pub use use_cases::chat_session::{ChatReply, ChatSession, ChatSessionError};
pub use use_cases::knowledge_base::{KnowledgeBaseError, KnowledgeBaseUseCase};
pub use use_cases::send_query::{
    Completion, SendQueryError, SendQueryInput, SendQueryOutput, SendQueryUseCase,
};
