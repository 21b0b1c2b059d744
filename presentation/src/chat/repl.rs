//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::config::{OutputConfig, ReplConfig};
use crate::output::console::ConsoleFormatter;
use crate::progress::stream_printer::StreamPrinter;
use colored::Colorize;
use ragchat_application::{ChatSession, Completion, KnowledgeBaseUseCase};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// A slash command typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    New,
    History,
    Open(String),
    Delete(String),
    Files,
    Upload(PathBuf),
    Remove(String),
    Stats,
    ClearStore,
    Quit,
    /// A known command without its required argument
    MissingArgument { command: &'static str, argument: &'static str },
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line starting with `/`. The argument is the rest of the line,
    /// so paths and names may contain spaces.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        let required = |command: &'static str, argument: &'static str, build: fn(&str) -> Self| {
            if arg.is_empty() {
                ReplCommand::MissingArgument { command, argument }
            } else {
                build(arg)
            }
        };

        match name {
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/new" => ReplCommand::New,
            "/history" => ReplCommand::History,
            "/open" => required("/open", "ID", |a| ReplCommand::Open(a.to_string())),
            "/delete" => required("/delete", "ID", |a| ReplCommand::Delete(a.to_string())),
            "/files" => ReplCommand::Files,
            "/upload" => required("/upload", "PATH", |a| ReplCommand::Upload(PathBuf::from(a))),
            "/remove" => required("/remove", "NAME", |a| ReplCommand::Remove(a.to_string())),
            "/stats" => ReplCommand::Stats,
            "/clear-store" => ReplCommand::ClearStore,
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            other => ReplCommand::Unknown(other.to_string()),
        }
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    session: ChatSession,
    knowledge: KnowledgeBaseUseCase,
    output: OutputConfig,
    repl: ReplConfig,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(session: ChatSession, knowledge: KnowledgeBaseUseCase) -> Self {
        Self {
            session,
            knowledge,
            output: OutputConfig::default(),
            repl: ReplConfig::default(),
        }
    }

    pub fn with_output_config(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    pub fn with_repl_config(mut self, repl: ReplConfig) -> Self {
        self.repl = repl;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = self.repl.history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    // Handle commands
                    if line.starts_with('/') {
                        if self.handle_command(ReplCommand::parse(line), &mut rl).await {
                            break;
                        }
                        continue;
                    }

                    self.process_query(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              ragchat - Chat Mode            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Ask anything about your documents. Ctrl-C stops an answer.");
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /new              - Start a new chat");
        println!("  /history          - List saved chats");
        println!("  /open ID          - Continue a saved chat");
        println!("  /delete ID        - Delete a saved chat");
        println!("  /files            - List knowledge base documents");
        println!("  /upload PATH      - Upload a file or folder");
        println!("  /remove NAME      - Delete a document");
        println!("  /stats            - Show vector store statistics");
        println!("  /clear-store      - Remove all indexed chunks");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, command: ReplCommand, rl: &mut DefaultEditor) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => {
                println!();
                Self::print_help();
            }
            ReplCommand::New => {
                self.session.new_chat();
                println!("{}", "Started a new chat.".dimmed());
            }
            ReplCommand::History => match self.session.list_chats().await {
                Ok(chats) => print!("{}", ConsoleFormatter::format_chat_list(&chats)),
                Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.to_string())),
            },
            ReplCommand::Open(id) => match self.session.open(&id).await {
                Ok(()) => {
                    let state = self.session.state();
                    println!(
                        "Opened \"{}\" ({} messages)",
                        state.title().unwrap_or_default(),
                        state.messages().len()
                    );
                    if let Some(reply) = state.last_assistant() {
                        println!();
                        print!(
                            "{}",
                            ConsoleFormatter::format_answer(reply, self.output.show_sources)
                        );
                    }
                }
                Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.to_string())),
            },
            ReplCommand::Delete(id) => match self.session.delete_chat(&id).await {
                Ok(()) => println!("Deleted chat {}", id),
                Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.to_string())),
            },
            ReplCommand::Files => match self.knowledge.list_files().await {
                Ok(files) => print!("{}", ConsoleFormatter::format_files(&files)),
                Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.to_string())),
            },
            ReplCommand::Upload(path) => match self.knowledge.upload_paths(&[path]).await {
                Ok(report) => print!("{}", ConsoleFormatter::format_upload_report(&report)),
                Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.to_string())),
            },
            ReplCommand::Remove(name) => match self.knowledge.delete_file(&name).await {
                Ok(()) => println!("Deleted {}", name),
                Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.to_string())),
            },
            ReplCommand::Stats => match self.knowledge.stats().await {
                Ok(stats) => print!("{}", ConsoleFormatter::format_stats(&stats)),
                Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.to_string())),
            },
            ReplCommand::ClearStore => {
                let confirmed = matches!(
                    rl.readline("Remove every indexed chunk? [y/N] "),
                    Ok(answer) if answer.trim().eq_ignore_ascii_case("y")
                );
                if !confirmed {
                    println!("{}", "Kept the vector store.".dimmed());
                } else {
                    match self.knowledge.clear_vector_store().await {
                        Ok(()) => println!("Vector store cleared."),
                        Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.to_string())),
                    }
                }
            }
            ReplCommand::MissingArgument { command, argument } => {
                println!("Usage: {} {}", command, argument);
            }
            ReplCommand::Unknown(name) => {
                println!("Unknown command: {}", name);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn process_query(&mut self, query: &str) {
        println!();

        let printer = StreamPrinter::new()
            .with_spinner(self.repl.show_progress)
            .with_sources(self.output.show_sources);

        // Ctrl-C while streaming cancels the answer instead of the program
        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let result = self.session.send(query, &printer, &cancel).await;
        watcher.abort();

        match result {
            Ok(reply) => {
                if reply.completion == Completion::Closed {
                    println!(
                        "{}",
                        "(the answer ended early; sources are unavailable)".dimmed()
                    );
                }
                if let Some(error) = reply.save_error {
                    eprintln!(
                        "{}",
                        ConsoleFormatter::format_warning(&format!("chat not saved: {}", error))
                    );
                }
            }
            Err(e) if e.is_cancelled() => println!("{}", "Cancelled.".dimmed()),
            Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.to_string())),
        }
        println!();
    }
}
