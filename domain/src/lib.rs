//! Domain layer for rag-chat
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Answer stream
//!
//! The backend streams each answer as `data: ` lines. The
//! [`StreamAssembler`] turns raw response chunks into [`StreamUpdate`]s:
//! content fragments in receipt order, then a terminal `Done` (with the
//! cited [`Source`]s attached), `Error`, or `Closed`.
//!
//! ## Chat state
//!
//! The open conversation lives in a [`ChatState`] that only changes through
//! [`ChatAction`]s, so presentation code never mutates messages directly.

pub mod chat;
pub mod core;
pub mod knowledge;
pub mod stream;

// Re-export commonly used types
pub use chat::{
    entities::{HistoryTurn, Message, Role, Source, SourceMetadata},
    history::{ChatRecord, ChatSummary, NewChat, derive_title},
    state::{ChatAction, ChatState},
};
pub use crate::core::{error::DomainError, query::Query};
pub use knowledge::entities::{
    FailedUpload, KnowledgeFile, UploadFile, UploadReport, VectorStoreStats,
};
pub use stream::{
    assembler::{StreamAssembler, StreamUpdate},
    decoder::LineDecoder,
    frame::Frame,
};
