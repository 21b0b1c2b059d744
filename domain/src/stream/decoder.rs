//! Incremental UTF-8 line decoder
//!
//! Network reads hand us arbitrary byte slices: a multi-byte character or a
//! line may be split across two chunks. [`LineDecoder`] carries the leftover
//! bytes and the unfinished line between calls so callers only ever see
//! complete, correctly decoded lines.

/// Stateful decoder turning byte chunks into complete lines
#[derive(Debug, Default)]
pub struct LineDecoder {
    /// Trailing bytes of an incomplete UTF-8 sequence
    pending_bytes: Vec<u8>,
    /// Decoded text after the last newline
    partial_line: String,
    /// Prefix of `partial_line` already searched for a newline
    scanned: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every line it completed, without terminators.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode(chunk);
        self.drain_lines()
    }

    /// Flush whatever is left once the input has ended.
    ///
    /// A dangling incomplete UTF-8 sequence decodes to U+FFFD.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending_bytes.is_empty() {
            let rest = std::mem::take(&mut self.pending_bytes);
            self.partial_line.push_str(&String::from_utf8_lossy(&rest));
        }
        if self.partial_line.is_empty() {
            return None;
        }
        self.scanned = 0;
        let mut line = std::mem::take(&mut self.partial_line);
        if line.ends_with('\r') {
            line.pop();
        }
        Some(line)
    }

    /// Bytes and characters currently held back, for diagnostics
    pub fn buffered_len(&self) -> usize {
        self.pending_bytes.len() + self.partial_line.len()
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.pending_bytes.extend_from_slice(chunk);

        let mut consumed = 0;
        while consumed < self.pending_bytes.len() {
            let rest = &self.pending_bytes[consumed..];
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.partial_line.push_str(text);
                    consumed = self.pending_bytes.len();
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    self.partial_line
                        .push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match e.error_len() {
                        // Invalid sequence in the middle: replace and move on
                        Some(len) => {
                            self.partial_line.push(char::REPLACEMENT_CHARACTER);
                            consumed += valid + len;
                        }
                        // Sequence cut off by the chunk boundary: wait for more
                        None => {
                            consumed += valid;
                            break;
                        }
                    }
                }
            }
        }
        self.pending_bytes.drain(..consumed);
    }

    fn drain_lines(&mut self) -> Vec<String> {
        // Only text decoded since the last call can hold a new line break
        let Some(last) = self.partial_line[self.scanned..]
            .rfind('\n')
            .map(|pos| pos + self.scanned)
        else {
            self.scanned = self.partial_line.len();
            return Vec::new();
        };

        let rest = self.partial_line.split_off(last + 1);
        let complete = std::mem::replace(&mut self.partial_line, rest);
        self.scanned = self.partial_line.len();

        complete[..last]
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_complete_lines() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"data: a\ndata: b\n");
        assert_eq!(lines, vec!["data: a", "data: b"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn keeps_partial_line_until_newline() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"data: hel").is_empty());
        assert_eq!(decoder.buffered_len(), 9);
        assert_eq!(decoder.push(b"lo\n"), vec!["data: hello"]);
    }

    #[test]
    fn strips_carriage_returns() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.push(b"a\r\nb\r"), vec!["a"]);
        assert_eq!(decoder.push(b"\n"), vec!["b"]);
    }

    #[test]
    fn reassembles_multibyte_split_across_chunks() {
        let bytes = "ü€🦀\n".as_bytes();
        let mut decoder = LineDecoder::new();
        let mut lines = Vec::new();
        for b in bytes {
            lines.extend(decoder.push(std::slice::from_ref(b)));
        }
        assert_eq!(lines, vec!["ü€🦀"]);
    }

    #[test]
    fn invalid_bytes_become_replacement_char() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"a\xffb\n");
        assert_eq!(lines, vec!["a\u{FFFD}b"]);
    }

    #[test]
    fn finish_flushes_residual_line() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"data: [DONE]").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("data: [DONE]"));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn finish_replaces_truncated_sequence() {
        let mut decoder = LineDecoder::new();
        // First two bytes of a three-byte character
        assert!(decoder.push(&[b'x', 0xe2, 0x82]).is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("x\u{FFFD}"));
    }

    #[test]
    fn empty_lines_are_reported() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.push(b"a\n\nb\n"), vec!["a", "", "b"]);
    }

    #[test]
    fn long_line_in_small_chunks_comes_out_once() {
        let payload = format!("data: [SOURCES]{}[/SOURCES]", "x".repeat(1 << 20));
        let input = format!("{payload}\ndata: [DONE]\n");

        let mut decoder = LineDecoder::new();
        let mut lines = Vec::new();
        for chunk in input.as_bytes().chunks(256) {
            lines.extend(decoder.push(chunk));
        }
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], payload);
        assert_eq!(lines[1], "data: [DONE]");
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn newline_after_long_partial_is_found() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"data: abc").is_empty());
        assert!(decoder.push(b"def").is_empty());
        assert_eq!(decoder.push(b"g\r\ndata: h"), vec!["data: abcdefg"]);
        assert_eq!(decoder.push(b"\n"), vec!["data: h"]);
    }
}
