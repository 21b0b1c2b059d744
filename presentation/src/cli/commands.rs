//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for answers and listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Streamed, human-readable text
    #[default]
    Text,
    /// A single JSON document once the command finishes
    Json,
}

/// CLI arguments for ragchat
#[derive(Parser, Debug)]
#[command(name = "ragchat")]
#[command(author, version, about = "Chat with your documents through a RAG backend")]
#[command(long_about = r#"
ragchat sends questions to a retrieval-augmented generation backend and
streams the answer back, citing the documents it was drawn from.

Conversations are saved to the backend's history, and the knowledge base
(the documents answers are retrieved from) can be managed from here too.

Configuration files are loaded from (in priority order):
1. RAGCHAT_* environment variables, e.g. RAGCHAT_BACKEND__URL
2. --config <path>                   Explicit config file
3. ./ragchat.toml                    Project-level config
4. ~/.config/ragchat/config.toml     Global config

Example:
  ragchat "What does the onboarding guide say about VPN access?"
  ragchat --chat
  ragchat files upload ./handbook
  ragchat history list
"#)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// The question to ask (not required in chat mode)
    pub query: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Backend base URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Manage saved conversations
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },
    /// Manage the knowledge base
    Files {
        #[command(subcommand)]
        action: FilesCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HistoryCommand {
    /// List saved conversations
    List,
    /// Print a saved conversation
    Show {
        /// Chat id
        id: String,
    },
    /// Delete a saved conversation
    Delete {
        /// Chat id
        id: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FilesCommand {
    /// List documents in the knowledge base
    List,
    /// Upload files or whole folders
    Upload {
        /// Files or folders to upload
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },
    /// Delete a document from the knowledge base
    Delete {
        /// Document name as shown by `files list`
        name: String,
    },
    /// Remove every indexed chunk from the vector store
    Clear,
    /// Show vector store statistics
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ragchat").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_positional_query() {
        let cli = parse(&["what is rag?", "-vv"]);
        assert_eq!(cli.query.as_deref(), Some("what is rag?"));
        assert_eq!(cli.verbose, 2);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_history_subcommands() {
        let cli = parse(&["history", "show", "42"]);
        assert_eq!(
            cli.command,
            Some(Command::History {
                action: HistoryCommand::Show { id: "42".into() }
            })
        );
    }

    #[test]
    fn test_files_upload_takes_many_paths() {
        let cli = parse(&["files", "upload", "a.pdf", "docs/", "--quiet"]);
        assert!(cli.quiet);
        match cli.command {
            Some(Command::Files {
                action: FilesCommand::Upload { paths },
            }) => assert_eq!(paths, vec![PathBuf::from("a.pdf"), PathBuf::from("docs/")]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_upload_requires_a_path() {
        assert!(Cli::try_parse_from(["ragchat", "files", "upload"]).is_err());
    }

    #[test]
    fn test_output_and_url_flags() {
        let cli = parse(&["--output", "json", "--url", "http://rag:9000", "q"]);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.url.as_deref(), Some("http://rag:9000"));
    }
}
