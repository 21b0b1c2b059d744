//! Append-only JSONL conversation log.
//!
//! Every event becomes one line: `timestamp`, `session`, `type`, then the
//! payload's own fields. Runs share the file and are told apart by
//! `session`, the time the logger was opened.

use chrono::{SecondsFormat, Utc};
use ragchat_application::{ConversationEvent, ConversationLogger};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

#[derive(Serialize)]
struct LogLine<'a> {
    timestamp: String,
    session: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

/// [`ConversationLogger`] writing to a JSONL file
pub struct JsonlConversationLogger {
    file: Mutex<BufWriter<File>>,
    path: PathBuf,
    session: String,
}

impl JsonlConversationLogger {
    /// Open `path` for appending, creating it and its parent folders.
    ///
    /// Logging is optional, so failure is reported as a warning and `None`.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(file) => Some(Self {
                file: Mutex::new(BufWriter::new(file)),
                path: path.to_path_buf(),
                session: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            }),
            Err(e) => {
                warn!("Conversation log {} disabled: {}", path.display(), e);
                None
            }
        }
    }

    fn open(path: &Path) -> std::io::Result<File> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session(&self) -> &str {
        &self.session
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let payload = match event.payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => Map::from_iter([("data".to_string(), other)]),
        };
        let line = LogLine {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            session: &self.session,
            kind: event.kind.as_str(),
            payload,
        };

        let Ok(mut file) = self.file.lock() else {
            return;
        };
        let written = serde_json::to_writer(&mut *file, &line)
            .map_err(std::io::Error::from)
            .and_then(|()| file.write_all(b"\n"))
            .and_then(|()| file.flush());
        if let Err(e) = written {
            warn!("Failed to write conversation log {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_application::EventKind;

    fn lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_events_are_flattened_into_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(ConversationEvent::new(
            EventKind::QuerySent,
            serde_json::json!({ "query": "what is rag?", "history_turns": 0 }),
        ));
        logger.log(ConversationEvent::new(
            EventKind::AnswerCompleted,
            serde_json::json!({ "completion": "done", "sources": ["a.pdf"] }),
        ));

        let lines = lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "query_sent");
        assert_eq!(lines[0]["query"], "what is rag?");
        assert_eq!(lines[0]["session"], logger.session());
        assert!(lines[0]["timestamp"].is_string());
        assert_eq!(lines[1]["sources"][0], "a.pdf");
    }

    #[test]
    fn test_null_and_scalar_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(ConversationEvent::new(EventKind::VectorStoreCleared, Value::Null));
        logger.log(ConversationEvent::new(EventKind::FileDeleted, Value::from("a.pdf")));

        let lines = lines(&path);
        assert_eq!(lines[0]["type"], "vector_store_cleared");
        assert!(lines[0].get("data").is_none());
        assert_eq!(lines[1]["data"], "a.pdf");
    }

    #[test]
    fn test_appends_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/log.jsonl");

        for query in ["first", "second"] {
            let logger = JsonlConversationLogger::new(&path).unwrap();
            logger.log(ConversationEvent::new(
                EventKind::QuerySent,
                serde_json::json!({ "query": query }),
            ));
        }

        let lines = lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["query"], "second");
    }

    #[test]
    fn test_unopenable_path_disables_logging() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        assert!(JsonlConversationLogger::new(blocker.join("log.jsonl")).is_none());
    }
}
