//! Application-level configuration.
//!
//! Controls how chat use cases behave: how much context is sent with each
//! query and whether conversations are saved automatically.

/// Default number of prior messages sent as context
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Chat behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Most recent messages sent as history with each query (0 = all)
    pub history_limit: usize,
    /// Persist the conversation to the backend after every answer
    pub autosave: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            autosave: true,
        }
    }
}

impl ChatConfig {
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert!(config.autosave);
    }

    #[test]
    fn test_builders() {
        let config = ChatConfig::default()
            .with_history_limit(0)
            .with_autosave(false);
        assert_eq!(config.history_limit, 0);
        assert!(!config.autosave);
    }
}
