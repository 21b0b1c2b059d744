//! Frames of the answer stream protocol
//!
//! The backend answers a query with newline-separated `data: <payload>`
//! lines. A payload is either a content fragment or one of the control
//! markers:
//!
//! ```text
//! data: Hello
//! data: [SOURCES][{"content":"...","metadata":{"source":"doc.pdf"}}][/SOURCES]
//! data: [DONE]
//! ```
//!
//! `[ERROR]message[/ERROR]` replaces `[DONE]` when the backend fails.

use crate::chat::entities::Source;

/// Prefix marking a protocol line
pub const DATA_PREFIX: &str = "data: ";
pub const DONE_MARKER: &str = "[DONE]";
pub const ERROR_OPEN: &str = "[ERROR]";
pub const ERROR_CLOSE: &str = "[/ERROR]";
pub const SOURCES_OPEN: &str = "[SOURCES]";
pub const SOURCES_CLOSE: &str = "[/SOURCES]";

/// Shown when an `[ERROR]` frame carries no message
const UNSPECIFIED_ERROR: &str = "The server reported an error";

/// One classified `data:` payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Text to append verbatim to the answer
    Content(String),
    /// Sources payload that parsed successfully
    Sources(Vec<Source>),
    /// Sources payload that failed to parse; carries the parse error
    MalformedSources(String),
    /// End of the answer
    Done,
    /// Backend-signaled failure
    Error(String),
}

impl Frame {
    /// Classify a raw line; `None` for lines that are not `data:` frames.
    pub fn parse_line(line: &str) -> Option<Frame> {
        line.strip_prefix(DATA_PREFIX).map(Frame::classify)
    }

    /// Classify a payload with the `data: ` prefix already removed.
    pub fn classify(payload: &str) -> Frame {
        if let Some(inner) = payload
            .strip_prefix(SOURCES_OPEN)
            .and_then(|rest| rest.strip_suffix(SOURCES_CLOSE))
        {
            return match serde_json::from_str::<Vec<Source>>(inner) {
                Ok(sources) => Frame::Sources(sources),
                Err(e) => Frame::MalformedSources(e.to_string()),
            };
        }

        if payload == DONE_MARKER {
            return Frame::Done;
        }

        if let Some(rest) = payload.strip_prefix(ERROR_OPEN) {
            let message = rest.strip_suffix(ERROR_CLOSE).unwrap_or(rest).trim();
            let message = if message.is_empty() {
                UNSPECIFIED_ERROR
            } else {
                message
            };
            return Frame::Error(message.to_string());
        }

        Frame::Content(payload.to_string())
    }

    /// Whether this frame ends the stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, Frame::Done | Frame::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_content_verbatim() {
        assert_eq!(Frame::classify(" world"), Frame::Content(" world".into()));
        assert_eq!(Frame::classify(""), Frame::Content(String::new()));
    }

    #[test]
    fn classify_done_requires_exact_match() {
        assert_eq!(Frame::classify("[DONE]"), Frame::Done);
        assert_eq!(
            Frame::classify("[DONE] "),
            Frame::Content("[DONE] ".into())
        );
    }

    #[test]
    fn classify_sources() {
        let frame = Frame::classify(
            r#"[SOURCES][{"content":"a","metadata":{"source":"doc.pdf","page":2}}][/SOURCES]"#,
        );
        let Frame::Sources(sources) = frame else {
            panic!("expected sources, got {frame:?}");
        };
        assert_eq!(sources, vec![Source::new("a", "doc.pdf").with_page(2)]);
    }

    #[test]
    fn classify_malformed_sources() {
        assert!(matches!(
            Frame::classify("[SOURCES]not-json[/SOURCES]"),
            Frame::MalformedSources(_)
        ));
        // An object instead of an array is malformed too
        assert!(matches!(
            Frame::classify(r#"[SOURCES]{"content":"a"}[/SOURCES]"#),
            Frame::MalformedSources(_)
        ));
    }

    #[test]
    fn unterminated_sources_is_content() {
        assert_eq!(
            Frame::classify("[SOURCES][]"),
            Frame::Content("[SOURCES][]".into())
        );
    }

    #[test]
    fn classify_error_with_and_without_close_tag() {
        assert_eq!(
            Frame::classify("[ERROR]index unavailable[/ERROR]"),
            Frame::Error("index unavailable".into())
        );
        assert_eq!(
            Frame::classify("[ERROR] timeout"),
            Frame::Error("timeout".into())
        );
        assert_eq!(
            Frame::classify("[ERROR][/ERROR]"),
            Frame::Error(UNSPECIFIED_ERROR.into())
        );
    }

    #[test]
    fn parse_line_requires_prefix() {
        assert_eq!(Frame::parse_line("data: hi"), Some(Frame::Content("hi".into())));
        assert_eq!(Frame::parse_line(": keep-alive"), None);
        assert_eq!(Frame::parse_line("event: message"), None);
        assert_eq!(Frame::parse_line(""), None);
    }

    #[test]
    fn terminal_frames() {
        assert!(Frame::Done.is_terminal());
        assert!(Frame::Error("x".into()).is_terminal());
        assert!(!Frame::Sources(vec![]).is_terminal());
    }
}
