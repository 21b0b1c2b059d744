//! CLI entrypoint for rag-chat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use ragchat_application::{
    ChatSession, Completion, ConversationLogger, KnowledgeBaseUseCase,
    NoChatProgress, NoConversationLogger, RagBackend,
};
use ragchat_infrastructure::{
    ConfigLoader, FileConfig, FileOutputFormat, HttpRagBackend, JsonlConversationLogger,
    LocalUploadSource,
};
use ragchat_presentation::{
    ChatRepl, Cli, Command, ConsoleFormatter, FilesCommand, HistoryCommand, OutputConfig,
    OutputFormat, ReplConfig, StreamPrinter,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    // Load configuration
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    if let Some(url) = &cli.url {
        config.backend.url = url.clone();
    }
    config.validate()?;

    let _log_guard = init_logging(cli.verbose, &config);
    info!("Starting ragchat against {}", config.backend.url);

    let output = output_config(&cli, &config);
    if !output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let mut backend = HttpRagBackend::new(&config.backend.url)?
        .with_endpoints(config.backend.endpoints.clone());
    if let Some(timeout) = config.backend.timeout() {
        backend = backend.with_timeout(timeout)?;
    }
    let backend: Arc<dyn RagBackend> = Arc::new(backend);

    let conversation_logger: Arc<dyn ConversationLogger> = config
        .logging
        .conversation_log
        .as_ref()
        .and_then(JsonlConversationLogger::new)
        .map(|logger| Arc::new(logger) as Arc<dyn ConversationLogger>)
        .unwrap_or_else(|| Arc::new(NoConversationLogger));

    let mut session = ChatSession::new(backend.clone(), config.chat.to_chat_config())
        .with_conversation_logger(conversation_logger.clone());
    let knowledge = KnowledgeBaseUseCase::new(backend)
        .with_upload_source(Arc::new(LocalUploadSource))
        .with_conversation_logger(conversation_logger);

    if let Some(command) = &cli.command {
        return run_command(command, &mut session, &knowledge, &output).await;
    }

    // Chat mode
    if cli.chat {
        let repl = ReplConfig {
            show_progress: !cli.quiet,
            history_file: config.repl.history_file.clone(),
        };
        let mut chat = ChatRepl::new(session, knowledge)
            .with_output_config(output)
            .with_repl_config(repl);
        chat.run().await?;
        return Ok(());
    }

    // Single query mode - query is required
    let Some(query) = cli.query.as_deref() else {
        bail!("A question is required. Use --chat for interactive mode.");
    };

    ask(query, &mut session, &output, !cli.quiet).await
}

/// Console logging follows `-v`; a daily rolling file is added when
/// `logging.log_dir` is set. The returned guard must live until exit.
fn init_logging(verbose: u8, config: &FileConfig) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match &config.logging.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "ragchat.log");
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::io::stderr.and(file_writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

fn output_config(cli: &Cli, config: &FileConfig) -> OutputConfig {
    let format = cli.output.unwrap_or(match config.output.format {
        Some(FileOutputFormat::Json) => OutputFormat::Json,
        Some(FileOutputFormat::Text) | None => OutputFormat::Text,
    });
    OutputConfig {
        format,
        color: config.output.color,
        show_sources: config.output.show_sources,
    }
}

/// Ask one question and print its answer.
async fn ask(
    query: &str,
    session: &mut ChatSession,
    output: &OutputConfig,
    show_progress: bool,
) -> Result<()> {
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let result = match output.format {
        OutputFormat::Text => {
            let printer = StreamPrinter::new()
                .with_spinner(show_progress)
                .with_sources(output.show_sources);
            session.send(query, &printer, &cancel).await
        }
        OutputFormat::Json => session.send(query, &NoChatProgress, &cancel).await,
    };
    watcher.abort();

    let reply = match result {
        Ok(reply) => reply,
        Err(e) if e.is_cancelled() => bail!("Cancelled"),
        Err(e) => return Err(e.into()),
    };

    if let Some(error) = &reply.save_error {
        warn!("Chat was not saved: {}", error);
    }

    match output.format {
        OutputFormat::Json => {
            let document = serde_json::json!({
                "content": reply.message.content,
                "sources": reply.message.sources(),
                "completion": reply.completion.as_str(),
                "chat_id": session.state().chat_id(),
            });
            println!("{}", ConsoleFormatter::format_json(&document));
        }
        OutputFormat::Text => {
            if reply.completion == Completion::Closed {
                eprintln!(
                    "{}",
                    ConsoleFormatter::format_warning(
                        "the answer ended early; sources are unavailable"
                    )
                );
            }
        }
    }
    Ok(())
}

async fn run_command(
    command: &Command,
    session: &mut ChatSession,
    knowledge: &KnowledgeBaseUseCase,
    output: &OutputConfig,
) -> Result<()> {
    let json = output.format == OutputFormat::Json;

    match command {
        Command::History { action } => match action {
            HistoryCommand::List => {
                let chats = session.list_chats().await?;
                if json {
                    println!("{}", ConsoleFormatter::format_json(&chats));
                } else {
                    print!("{}", ConsoleFormatter::format_chat_list(&chats));
                }
            }
            HistoryCommand::Show { id } => {
                session.open(id).await?;
                let Some(record) = session.state().to_record() else {
                    bail!("Chat {} could not be loaded", id);
                };
                if json {
                    println!("{}", ConsoleFormatter::format_json(&record));
                } else {
                    print!(
                        "{}",
                        ConsoleFormatter::format_chat(&record, output.show_sources)
                    );
                }
            }
            HistoryCommand::Delete { id } => {
                session.delete_chat(id).await?;
                if !json {
                    println!("Deleted chat {}", id);
                }
            }
        },
        Command::Files { action } => match action {
            FilesCommand::List => {
                let files = knowledge.list_files().await?;
                if json {
                    println!("{}", ConsoleFormatter::format_json(&files));
                } else {
                    print!("{}", ConsoleFormatter::format_files(&files));
                }
            }
            FilesCommand::Upload { paths } => {
                let report = knowledge.upload_paths(paths).await?;
                if json {
                    println!("{}", ConsoleFormatter::format_json(&report));
                } else {
                    print!("{}", ConsoleFormatter::format_upload_report(&report));
                }
                if !report.failed.is_empty() {
                    bail!("{} of the files were rejected", report.failed.len());
                }
            }
            FilesCommand::Delete { name } => {
                knowledge.delete_file(name).await?;
                if !json {
                    println!("Deleted {}", name);
                }
            }
            FilesCommand::Clear => {
                knowledge.clear_vector_store().await?;
                if !json {
                    println!("Vector store cleared.");
                }
            }
            FilesCommand::Stats => {
                let stats = knowledge.stats().await?;
                if json {
                    println!("{}", ConsoleFormatter::format_json(&stats));
                } else {
                    print!("{}", ConsoleFormatter::format_stats(&stats));
                }
            }
        },
    }
    Ok(())
}
