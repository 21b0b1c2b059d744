//! Configuration file loading for rag-chat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `RAGCHAT_SECTION__KEY` (e.g. `RAGCHAT_BACKEND__URL`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./ragchat.toml` or `./.ragchat.toml`
//! 4. Global: `$XDG_CONFIG_HOME/ragchat/config.toml` (or the platform equivalent)
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBackendConfig, FileChatConfig, FileConfig, FileLoggingConfig,
    FileOutputConfig, FileOutputFormat, FileReplConfig,
};
pub use loader::ConfigLoader;
