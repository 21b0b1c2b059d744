//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod chat_session;
pub mod knowledge_base;
pub mod send_query;

#[cfg(test)]
pub(crate) mod fake_backend;
