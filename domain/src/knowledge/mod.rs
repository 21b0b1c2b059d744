//! Knowledge base domain.
//!
//! Files indexed by the backend's vector store, uploads, and store statistics.

pub mod entities;
