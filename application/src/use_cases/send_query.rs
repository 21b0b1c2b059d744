//! Send Query use case.
//!
//! Posts a query with its conversation history, feeds the streamed body
//! through a [`StreamAssembler`], and reports progress as fragments arrive.
//!
//! The stream ends in one of four ways:
//! - `[DONE]` → [`Completion::Done`], sources attached
//! - end of body without `[DONE]` → [`Completion::Closed`], no sources
//! - `[ERROR]` frame → [`SendQueryError::Backend`]
//! - read failure or cancellation → [`SendQueryError::Transport`] / [`SendQueryError::Cancelled`]
//!
//! No retry is attempted.

use crate::ports::chat_progress::ChatProgressNotifier;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, EventKind, NoConversationLogger,
};
use crate::ports::rag_backend::{BackendError, QueryRequest, RagBackend};
use futures::StreamExt;
use ragchat_domain::core::string::clip;
use ragchat_domain::{HistoryTurn, Message, Query, StreamAssembler, StreamUpdate};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur while streaming an answer.
#[derive(Error, Debug)]
pub enum SendQueryError {
    /// The backend sent an `[ERROR]` frame
    #[error("{0}")]
    Backend(String),

    /// The request or the stream read failed
    #[error("Failed to get a response from the server: {0}")]
    Transport(#[from] BackendError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl SendQueryError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SendQueryError::Cancelled)
    }
}

/// How a successful stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// `[DONE]` received; sources are attached
    Done,
    /// Body ended without `[DONE]`; sources were never finalized
    Closed,
}

impl Completion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Completion::Done => "done",
            Completion::Closed => "closed",
        }
    }
}

/// Input for the [`SendQueryUseCase`].
#[derive(Debug, Clone)]
pub struct SendQueryInput {
    pub query: Query,
    /// Prior turns sent as context
    pub history: Vec<HistoryTurn>,
}

impl SendQueryInput {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryTurn>) -> Self {
        self.history = history;
        self
    }
}

/// Final answer of a successful stream.
#[derive(Debug, Clone)]
pub struct SendQueryOutput {
    pub message: Message,
    pub completion: Completion,
}

/// Use case for streaming one answer.
#[derive(Clone)]
pub struct SendQueryUseCase {
    backend: Arc<dyn RagBackend>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl SendQueryUseCase {
    pub fn new(backend: Arc<dyn RagBackend>) -> Self {
        Self {
            backend,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Stream the answer to `input`, reporting fragments to `progress`.
    ///
    /// Cancelling `cancel` stops reading immediately; the partial answer is
    /// whatever `progress` has seen.
    pub async fn execute(
        &self,
        input: SendQueryInput,
        progress: &dyn ChatProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<SendQueryOutput, SendQueryError> {
        let started = Instant::now();
        let query = input.query.content();
        info!(
            "Sending query ({} history turns): {}",
            input.history.len(),
            clip(query, 100)
        );
        self.conversation_logger.log(ConversationEvent::new(
            EventKind::QuerySent,
            serde_json::json!({
                "query": query,
                "history_turns": input.history.len(),
            }),
        ));

        progress.on_stream_start(query);
        let request = QueryRequest::new(query, input.history);

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.backend.stream_answer(&request) => Some(result),
        };
        let mut stream = match opened {
            None => return Err(self.fail(SendQueryError::Cancelled, progress, 0)),
            Some(Err(e)) => return Err(self.fail(SendQueryError::Transport(e), progress, 0)),
            Some(Ok(stream)) => stream,
        };

        let mut assembler = StreamAssembler::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    assembler.abort();
                    return Err(self.fail(
                        SendQueryError::Cancelled,
                        progress,
                        assembler.content().len(),
                    ));
                }
                next = stream.next() => next,
            };

            let updates = match next {
                Some(Ok(chunk)) => {
                    debug!("Answer chunk: {} bytes", chunk.len());
                    assembler.push(&chunk)
                }
                Some(Err(e)) => {
                    assembler.abort();
                    return Err(self.fail(
                        SendQueryError::Transport(e),
                        progress,
                        assembler.content().len(),
                    ));
                }
                None => assembler.finish(),
            };

            for update in updates {
                match update {
                    StreamUpdate::Content { delta, content } => {
                        progress.on_content(&delta, &content);
                    }
                    StreamUpdate::Sources(sources) => {
                        debug!("Received {} sources", sources.len());
                        progress.on_sources(&sources);
                    }
                    StreamUpdate::SourcesDiscarded { reason } => {
                        warn!("Discarding malformed sources payload: {}", reason);
                    }
                    StreamUpdate::Error(message) => {
                        return Err(self.fail(
                            SendQueryError::Backend(message),
                            progress,
                            assembler.content().len(),
                        ));
                    }
                    StreamUpdate::Done(message) => {
                        return Ok(self.complete(message, Completion::Done, progress, started));
                    }
                    StreamUpdate::Closed(message) => {
                        warn!("Answer stream ended without [DONE]");
                        return Ok(self.complete(message, Completion::Closed, progress, started));
                    }
                }
            }
        }
    }

    fn complete(
        &self,
        message: Message,
        completion: Completion,
        progress: &dyn ChatProgressNotifier,
        started: Instant,
    ) -> SendQueryOutput {
        let elapsed = started.elapsed();
        info!(
            "Answer {} after {:?}: {} bytes, {} sources",
            completion.as_str(),
            elapsed,
            message.content.len(),
            message.sources().len()
        );
        self.conversation_logger.log(ConversationEvent::new(
            EventKind::AnswerCompleted,
            serde_json::json!({
                "completion": completion.as_str(),
                "content": message.content,
                "sources": message.sources().iter().map(|s| s.label()).collect::<Vec<_>>(),
                "elapsed_ms": elapsed.as_millis() as u64,
            }),
        ));
        progress.on_stream_end(&message);
        SendQueryOutput {
            message,
            completion,
        }
    }

    fn fail(
        &self,
        error: SendQueryError,
        progress: &dyn ChatProgressNotifier,
        partial_bytes: usize,
    ) -> SendQueryError {
        if error.is_cancelled() {
            info!("Answer stream cancelled after {} bytes", partial_bytes);
        } else {
            warn!("Answer stream failed after {} bytes: {}", partial_bytes, error);
        }
        self.conversation_logger.log(ConversationEvent::new(
            EventKind::AnswerFailed,
            serde_json::json!({
                "error": error.to_string(),
                "cancelled": error.is_cancelled(),
                "partial_bytes": partial_bytes,
            }),
        ));
        progress.on_stream_error(&error.to_string());
        error
    }
}
