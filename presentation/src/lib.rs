//! Presentation layer for rag-chat
//!
//! This crate contains CLI definitions, output formatters,
//! the streaming answer printer, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand};
pub use cli::commands::{Cli, Command, FilesCommand, HistoryCommand, OutputFormat};
pub use config::{OutputConfig, ReplConfig};
pub use output::console::ConsoleFormatter;
pub use progress::stream_printer::StreamPrinter;
