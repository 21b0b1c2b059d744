//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation
//! adapters must implement.

pub mod chat_progress;
pub mod conversation_logger;
pub mod rag_backend;
pub mod upload_source;
