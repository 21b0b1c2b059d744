//! Chat progress notification port
//!
//! Defines the interface for reporting a streaming answer as it arrives.

use ragchat_domain::{Message, Source};
use std::sync::Mutex;

/// Callback for updates while an answer streams in
///
/// Implementations live in the presentation layer and can display
/// the answer in various ways (console, TUI, etc.)
pub trait ChatProgressNotifier: Send + Sync {
    /// Called before the query is posted
    fn on_stream_start(&self, _query: &str) {}

    /// Called for every content fragment; `content` is the full answer so far
    fn on_content(&self, delta: &str, content: &str);

    /// Called when a sources payload arrives
    fn on_sources(&self, _sources: &[Source]) {}

    /// Called once the answer is final
    fn on_stream_end(&self, _message: &Message) {}

    /// Called when the stream fails, is cancelled, or the backend signals an error
    fn on_stream_error(&self, _error: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoChatProgress;

impl ChatProgressNotifier for NoChatProgress {
    fn on_content(&self, _delta: &str, _content: &str) {}
}

/// Adapter that remembers the latest content while forwarding every callback
///
/// Lets a caller recover the partial answer after a failed or cancelled
/// stream without the inner notifier having to keep it.
pub struct RecordingProgress<'a> {
    inner: &'a dyn ChatProgressNotifier,
    latest: Mutex<String>,
}

impl<'a> RecordingProgress<'a> {
    pub fn new(inner: &'a dyn ChatProgressNotifier) -> Self {
        Self {
            inner,
            latest: Mutex::new(String::new()),
        }
    }

    /// Most recent full content seen
    pub fn latest_content(&self) -> String {
        self.latest
            .lock()
            .map(|content| content.clone())
            .unwrap_or_default()
    }
}

impl ChatProgressNotifier for RecordingProgress<'_> {
    fn on_stream_start(&self, query: &str) {
        self.inner.on_stream_start(query);
    }

    fn on_content(&self, delta: &str, content: &str) {
        if let Ok(mut latest) = self.latest.lock() {
            latest.clear();
            latest.push_str(content);
        }
        self.inner.on_content(delta, content);
    }

    fn on_sources(&self, sources: &[Source]) {
        self.inner.on_sources(sources);
    }

    fn on_stream_end(&self, message: &Message) {
        self.inner.on_stream_end(message);
    }

    fn on_stream_error(&self, error: &str) {
        self.inner.on_stream_error(error);
    }
}
