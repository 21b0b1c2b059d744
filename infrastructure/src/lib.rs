//! Infrastructure layer for rag-chat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod backend;
pub mod config;
pub mod logging;
pub mod uploads;

// Re-export commonly used types
pub use backend::{DEFAULT_BASE_URL, Endpoints, HttpRagBackend};
pub use config::{
    ConfigLoader, ConfigValidationError, FileBackendConfig, FileChatConfig, FileConfig,
    FileLoggingConfig, FileOutputConfig, FileOutputFormat, FileReplConfig,
};
pub use logging::JsonlConversationLogger;
pub use uploads::{LocalUploadSource, UploadCollectError, collect_uploads};
