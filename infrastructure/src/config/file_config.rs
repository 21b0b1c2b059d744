//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types where needed.

use crate::backend::{DEFAULT_BASE_URL, Endpoints};
use ragchat_application::{ChatConfig, DEFAULT_HISTORY_LIMIT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default timeout for non-streaming requests
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("backend url must start with http:// or https://, got {0:?}")]
    InvalidUrl(String),
}

/// Raw backend configuration from TOML (`[backend]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Base URL of the RAG backend
    pub url: String,
    /// Timeout in seconds for non-streaming requests
    pub timeout_seconds: Option<u64>,
    /// Endpoint paths (`[backend.endpoints]`)
    pub endpoints: Endpoints,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
            endpoints: Endpoints::default(),
        }
    }
}

impl FileBackendConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Raw chat configuration from TOML (`[chat]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Prior messages sent with each query (0 = all)
    pub history_limit: usize,
    /// Save conversations after every answer
    pub autosave: bool,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            autosave: true,
        }
    }
}

impl FileChatConfig {
    pub fn to_chat_config(&self) -> ChatConfig {
        ChatConfig::default()
            .with_history_limit(self.history_limit)
            .with_autosave(self.autosave)
    }
}

/// Output format selectable from the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOutputFormat {
    Text,
    Json,
}

/// Raw output configuration from TOML (`[output]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub format: Option<FileOutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// Print cited sources under each answer
    pub show_sources: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            show_sources: true,
        }
    }
}

/// Raw REPL configuration from TOML (`[repl]`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Path to the input history file
    pub history_file: Option<String>,
}

/// Raw logging configuration from TOML (`[logging]`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily rolling operation logs
    pub log_dir: Option<String>,
    /// Path of the JSONL conversation log
    pub conversation_log: Option<String>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub backend: FileBackendConfig,
    pub chat: FileChatConfig,
    pub output: FileOutputConfig,
    pub repl: FileReplConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(0) = self.backend.timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        let url = self.backend.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigValidationError::InvalidUrl(self.backend.url.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[backend]
url = "http://rag.internal:9000"
timeout_seconds = 120

[backend.endpoints]
chat_stream = "/v2/chat"

[chat]
history_limit = 4
autosave = false

[output]
format = "json"
color = false
show_sources = false

[repl]
history_file = "~/.local/share/ragchat/history.txt"

[logging]
log_dir = "/tmp/ragchat-logs"
conversation_log = "/tmp/ragchat.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.url, "http://rag.internal:9000");
        assert_eq!(config.backend.timeout(), Some(Duration::from_secs(120)));
        assert_eq!(config.backend.endpoints.chat_stream, "/v2/chat");
        assert_eq!(config.backend.endpoints.files, "/api/files");
        assert_eq!(config.chat.history_limit, 4);
        assert!(!config.chat.autosave);
        assert_eq!(config.output.format, Some(FileOutputFormat::Json));
        assert!(!config.output.color);
        assert!(!config.output.show_sources);
        assert!(config.repl.history_file.is_some());
        assert_eq!(
            config.logging.conversation_log.as_deref(),
            Some("/tmp/ragchat.jsonl")
        );
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[chat]
history_limit = 0
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chat.history_limit, 0);
        // Defaults should apply
        assert!(config.chat.autosave);
        assert_eq!(config.backend.url, DEFAULT_BASE_URL);
        assert!(config.output.color);
        assert!(config.logging.log_dir.is_none());
    }

    #[test]
    fn test_to_chat_config() {
        let chat = FileChatConfig {
            history_limit: 6,
            autosave: false,
        };
        let config = chat.to_chat_config();
        assert_eq!(config.history_limit, 6);
        assert!(!config.autosave);
    }

    #[test]
    fn test_validate_default_config() {
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config: FileConfig = toml::from_str("[backend]\ntimeout_seconds = 0").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTimeout)
        ));
    }

    #[test]
    fn test_validate_url_scheme() {
        let config: FileConfig = toml::from_str("[backend]\nurl = \"localhost:8000\"").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidUrl(_))
        ));
    }
}
