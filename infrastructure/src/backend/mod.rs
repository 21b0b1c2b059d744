//! HTTP adapter for the RAG backend
//!
//! Implements [`RagBackend`](ragchat_application::RagBackend) over the
//! backend's REST API with `reqwest`.

mod endpoints;
mod error;
mod http;

pub use endpoints::Endpoints;
pub use http::{DEFAULT_BASE_URL, HttpRagBackend};
