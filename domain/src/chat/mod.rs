//! Chat domain.
//!
//! - [`entities::Message`]: a single message, optionally citing [`entities::Source`]s
//! - [`history::ChatRecord`]: a conversation as stored by the backend
//! - [`state::ChatState`]: the open conversation, mutated through [`state::ChatAction`]

pub mod entities;
pub mod history;
pub mod state;
