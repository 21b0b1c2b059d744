//! String helpers for titles and log previews.

/// Clip `s` to at most `max_bytes`, backing off to the previous char boundary.
pub fn clip(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Shorten `s` to at most `max_len` bytes, marking the cut with `...`.
pub fn ellipsize(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    format!("{}...", clip(s, max_len.saturating_sub(3)))
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_ascii() {
        assert_eq!(clip("retrieval", 4), "retr");
        assert_eq!(clip("rag", 10), "rag");
        assert_eq!(clip("", 3), "");
    }

    #[test]
    fn clip_backs_off_inside_multibyte_char() {
        // "é" is two bytes
        assert_eq!(clip("café", 4), "caf");
        assert_eq!(clip("café", 5), "café");
    }

    #[test]
    fn ellipsize_marks_cut() {
        assert_eq!(ellipsize("short", 10), "short");
        assert_eq!(ellipsize("hello world", 8), "hello...");
    }

    #[test]
    fn ellipsize_keeps_char_boundaries() {
        // 4-byte emoji: budget 10 -> 7 bytes -> one emoji
        assert_eq!(ellipsize("🦀🦀🦀", 10), "🦀...");
    }

    #[test]
    fn single_line_collapses_whitespace() {
        assert_eq!(single_line("  what\nis \t this  "), "what is this");
    }
}
