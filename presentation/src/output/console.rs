//! Console output formatter for answers, history, and the knowledge base

use colored::Colorize;
use ragchat_domain::core::string::single_line;
use ragchat_domain::{
    ChatRecord, ChatSummary, KnowledgeFile, Message, Role, Source, UploadReport, VectorStoreStats,
};
use serde::Serialize;

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format cited sources as a numbered list, one line per distinct label
    pub fn format_sources(sources: &[Source]) -> String {
        let mut labels: Vec<String> = Vec::new();
        for label in sources.iter().map(Source::label) {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }

        let mut output = format!("{}\n", "Sources:".cyan().bold());
        for (i, label) in labels.iter().enumerate() {
            output.push_str(&format!("  [{}] {}\n", i + 1, label));
        }
        output
    }

    /// Format a complete answer (used when nothing was streamed)
    pub fn format_answer(message: &Message, show_sources: bool) -> String {
        let mut output = format!("{}\n", message.content);
        if show_sources && !message.sources().is_empty() {
            output.push('\n');
            output.push_str(&Self::format_sources(message.sources()));
        }
        output
    }

    pub fn format_chat_list(chats: &[ChatSummary]) -> String {
        if chats.is_empty() {
            return format!("{}\n", "No saved chats.".dimmed());
        }

        let width = chats.iter().map(|c| c.id.len()).max().unwrap_or(0);
        let mut output = String::new();
        for chat in chats {
            let id = format!("{:<width$}", chat.id, width = width);
            output.push_str(&format!("  {}  {}", id.yellow(), single_line(&chat.title)));
            if let Some(updated) = &chat.updated_at {
                output.push_str(&format!("  {}", updated.dimmed()));
            }
            output.push('\n');
        }
        output
    }

    /// Format a stored conversation as a transcript
    pub fn format_chat(record: &ChatRecord, show_sources: bool) -> String {
        let mut output = Self::header(&record.title);
        output.push('\n');

        for message in &record.messages {
            let speaker = match message.role {
                Role::User => "You:".green().bold(),
                Role::Assistant => "Assistant:".cyan().bold(),
            };
            output.push_str(&format!("\n{}\n{}\n", speaker, message.content));
            if show_sources && !message.sources().is_empty() {
                output.push_str(&Self::indent(
                    &Self::format_sources(message.sources()),
                    "  ",
                ));
                output.push('\n');
            }
        }
        output
    }

    pub fn format_files(files: &[KnowledgeFile]) -> String {
        if files.is_empty() {
            return format!("{}\n", "The knowledge base is empty.".dimmed());
        }

        let mut output = String::new();
        for file in files {
            let mut details = Vec::new();
            if let Some(size) = file.size {
                details.push(Self::human_size(size));
            }
            if let Some(chunks) = file.chunks {
                details.push(format!("{} chunks", chunks));
            }

            output.push_str(&format!("  {}", file.name));
            if !details.is_empty() {
                output.push_str(&format!("  {}", details.join(", ").dimmed()));
            }
            output.push('\n');
        }
        output
    }

    pub fn format_upload_report(report: &UploadReport) -> String {
        let mut output = String::new();
        for name in &report.uploaded {
            output.push_str(&format!("  {} {}\n", "v".green(), name));
        }
        for failed in &report.failed {
            output.push_str(&format!(
                "  {} {}: {}\n",
                "x".red(),
                failed.name,
                failed.reason
            ));
        }
        output.push_str(&format!(
            "{} uploaded, {} failed\n",
            report.uploaded.len(),
            report.failed.len()
        ));
        output
    }

    pub fn format_stats(stats: &VectorStoreStats) -> String {
        let mut rows: Vec<(String, String)> = Vec::new();
        if let Some(collection) = &stats.collection {
            rows.push(("collection".into(), collection.clone()));
        }
        if let Some(documents) = stats.total_documents {
            rows.push(("documents".into(), documents.to_string()));
        }
        if let Some(chunks) = stats.total_chunks {
            rows.push(("chunks".into(), chunks.to_string()));
        }
        for (key, value) in &stats.extra {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            rows.push((key.clone(), value));
        }

        if rows.is_empty() {
            return format!("{}\n", "No statistics reported.".dimmed());
        }

        let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        rows.iter()
            .map(|(key, value)| {
                let key = format!("{:<width$}", key, width = width);
                format!("  {}  {}\n", key.cyan(), value)
            })
            .collect()
    }

    pub fn format_error(message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    pub fn format_warning(message: &str) -> String {
        format!("{} {}", "Warning:".yellow().bold(), message)
    }

    /// Format any serializable result as pretty JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Byte count in the largest unit that keeps the value at or above 1
    pub fn human_size(bytes: u64) -> String {
        const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
        if bytes < 1024 {
            return format!("{} B", bytes);
        }
        let mut value = bytes as f64;
        let mut unit = "B";
        for next in UNITS {
            if value < 1024.0 {
                break;
            }
            value /= 1024.0;
            unit = next;
        }
        format!("{:.1} {}", value, unit)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_domain::FailedUpload;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_sources_are_numbered_and_deduplicated() {
        plain();
        let sources = vec![
            Source::new("a", "guide.pdf").with_page(3),
            Source::new("b", "guide.pdf").with_page(3),
            Source::new("c", "faq.md"),
        ];
        assert_eq!(
            ConsoleFormatter::format_sources(&sources),
            "Sources:\n  [1] guide.pdf (p. 3)\n  [2] faq.md\n"
        );
    }

    #[test]
    fn test_answer_hides_sources_when_asked() {
        plain();
        let message = Message::assistant("42").with_sources(vec![Source::new("x", "h2g2.txt")]);
        assert_eq!(ConsoleFormatter::format_answer(&message, false), "42\n");
        assert!(ConsoleFormatter::format_answer(&message, true).contains("[1] h2g2.txt"));
    }

    #[test]
    fn test_chat_list_aligns_ids() {
        plain();
        let chats = vec![
            ChatSummary {
                id: "7".into(),
                title: "Short".into(),
                updated_at: None,
            },
            ChatSummary {
                id: "abc123".into(),
                title: "Multi\nline".into(),
                updated_at: Some("2026-10-01".into()),
            },
        ];
        assert_eq!(
            ConsoleFormatter::format_chat_list(&chats),
            "  7       Short\n  abc123  Multi line  2026-10-01\n"
        );
        assert_eq!(ConsoleFormatter::format_chat_list(&[]), "No saved chats.\n");
    }

    #[test]
    fn test_chat_transcript_labels_speakers() {
        plain();
        let record = ChatRecord {
            id: "1".into(),
            title: "VPN".into(),
            messages: vec![Message::user("how?"), Message::assistant("like this")],
            created_at: None,
            updated_at: None,
        };
        let output = ConsoleFormatter::format_chat(&record, true);
        assert!(output.contains("You:\nhow?"));
        assert!(output.contains("Assistant:\nlike this"));
    }

    #[test]
    fn test_files_show_size_and_chunks() {
        plain();
        let files = vec![
            KnowledgeFile {
                name: "a.pdf".into(),
                size: Some(2048),
                chunks: Some(5),
            },
            KnowledgeFile {
                name: "b.txt".into(),
                size: None,
                chunks: None,
            },
        ];
        assert_eq!(
            ConsoleFormatter::format_files(&files),
            "  a.pdf  2.0 KB, 5 chunks\n  b.txt\n"
        );
    }

    #[test]
    fn test_upload_report_summary() {
        plain();
        let report = UploadReport {
            uploaded: vec!["a.pdf".into()],
            failed: vec![FailedUpload {
                name: "b.exe".into(),
                reason: "unsupported".into(),
            }],
        };
        let output = ConsoleFormatter::format_upload_report(&report);
        assert!(output.contains("x b.exe: unsupported"));
        assert!(output.ends_with("1 uploaded, 1 failed\n"));
    }

    #[test]
    fn test_stats_include_extra_fields() {
        plain();
        let mut stats = VectorStoreStats {
            total_chunks: Some(120),
            ..VectorStoreStats::default()
        };
        stats
            .extra
            .insert("embedding_model".into(), serde_json::json!("minilm"));
        let output = ConsoleFormatter::format_stats(&stats);
        assert!(output.contains("chunks           120"));
        assert!(output.contains("embedding_model  minilm"));
    }

    #[test]
    fn test_human_size() {
        assert_eq!(ConsoleFormatter::human_size(512), "512 B");
        assert_eq!(ConsoleFormatter::human_size(1536), "1.5 KB");
        assert_eq!(ConsoleFormatter::human_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
