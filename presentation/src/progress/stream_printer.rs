//! Live rendering of a streaming answer

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use ragchat_application::ChatProgressNotifier;
use ragchat_domain::Message;
use std::io::{self, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Prints answer fragments as they arrive, with a spinner until the first one.
///
/// Sources are printed once the answer is final; errors are left to the
/// caller, which knows whether the stream was cancelled.
pub struct StreamPrinter {
    out: Mutex<Box<dyn Write + Send>>,
    spinner: Mutex<Option<ProgressBar>>,
    show_spinner: bool,
    show_sources: bool,
    wrote_content: AtomicBool,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            spinner: Mutex::new(None),
            show_spinner: true,
            show_sources: true,
            wrote_content: AtomicBool::new(false),
        }
    }

    pub fn with_spinner(mut self, show: bool) -> Self {
        self.show_spinner = show;
        self
    }

    pub fn with_sources(mut self, show: bool) -> Self {
        self.show_sources = show;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn clear_spinner(&self) {
        if let Ok(mut spinner) = self.spinner.lock()
            && let Some(pb) = spinner.take()
        {
            pb.finish_and_clear();
        }
    }

    fn write(&self, text: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = out.write_all(text.as_bytes());
            let _ = out.flush();
        }
    }

    /// Finish the current line if any content was printed
    fn end_line(&self) {
        if self.wrote_content.swap(false, Ordering::SeqCst) {
            self.write("\n");
        }
    }
}

impl Default for StreamPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatProgressNotifier for StreamPrinter {
    fn on_stream_start(&self, _query: &str) {
        self.wrote_content.store(false, Ordering::SeqCst);
        if !self.show_spinner {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message("Thinking...".dimmed().to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut spinner) = self.spinner.lock() {
            *spinner = Some(pb);
        }
    }

    fn on_content(&self, delta: &str, _content: &str) {
        self.clear_spinner();
        self.wrote_content.store(true, Ordering::SeqCst);
        self.write(delta);
    }

    fn on_stream_end(&self, message: &Message) {
        self.clear_spinner();
        self.end_line();
        if self.show_sources && !message.sources().is_empty() {
            self.write("\n");
            self.write(&ConsoleFormatter::format_sources(message.sources()));
        }
    }

    fn on_stream_error(&self, _error: &str) {
        self.clear_spinner();
        self.end_line();
    }
}
