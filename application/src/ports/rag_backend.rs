//! RAG backend port
//!
//! Defines the interface for talking to the retrieval backend: the answer
//! stream, chat history storage, and the knowledge base.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use ragchat_domain::{
    ChatRecord, ChatSummary, HistoryTurn, KnowledgeFile, NewChat, UploadFile, UploadReport,
    VectorStoreStats,
};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during backend operations
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Stream read failed: {0}")]
    StreamError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

impl BackendError {
    /// Whether the backend reported that the resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::Status { status: 404, .. })
    }
}

/// Raw body of a streamed answer, as received from the network
pub type AnswerStream = BoxStream<'static, Result<Bytes, BackendError>>;

/// Body of a streaming query request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub history: Vec<HistoryTurn>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, history: Vec<HistoryTurn>) -> Self {
        Self {
            query: query.into(),
            history,
        }
    }
}

/// Gateway to the RAG backend
///
/// This port defines how the application layer reaches the backend.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait RagBackend: Send + Sync {
    /// Post a query and return the raw answer stream
    async fn stream_answer(&self, request: &QueryRequest) -> Result<AnswerStream, BackendError>;

    // ==================== Chat History ====================

    async fn list_chats(&self) -> Result<Vec<ChatSummary>, BackendError>;

    async fn get_chat(&self, id: &str) -> Result<ChatRecord, BackendError>;

    async fn create_chat(&self, chat: &NewChat) -> Result<ChatRecord, BackendError>;

    async fn update_chat(&self, chat: &ChatRecord) -> Result<(), BackendError>;

    async fn delete_chat(&self, id: &str) -> Result<(), BackendError>;

    // ==================== Knowledge Base ====================

    async fn list_files(&self) -> Result<Vec<KnowledgeFile>, BackendError>;

    async fn upload_files(&self, files: &[UploadFile]) -> Result<UploadReport, BackendError>;

    async fn delete_file(&self, name: &str) -> Result<(), BackendError>;

    async fn clear_vector_store(&self) -> Result<(), BackendError>;

    async fn vector_store_stats(&self) -> Result<VectorStoreStats, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_domain::Role;

    #[test]
    fn query_request_wire_format() {
        let request = QueryRequest::new(
            "and page 3?",
            vec![HistoryTurn {
                role: Role::User,
                content: "summarize".into(),
            }],
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "query": "and page 3?",
                "history": [{"role": "user", "content": "summarize"}]
            })
        );
    }

    #[test]
    fn not_found_detection() {
        let err = BackendError::Status {
            status: 404,
            message: "missing".into(),
        };
        assert!(err.is_not_found());
        assert!(!BackendError::Timeout.is_not_found());
    }
}
