// src/exec/normalize.rs

//! Turning raw process output into clean text.

use std::sync::LazyLock;

use regex::Regex;

/// ASCII control characters other than tab (0x09), line feed (0x0A) and
/// carriage return (0x0D).
static CONTROL_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F]").expect("control character pattern is valid")
});

/// Decode captured output and clean it up for programmatic consumers.
///
/// - bytes are decoded as UTF-8, invalid sequences become U+FFFD;
/// - control characters are removed, tab and newlines are kept;
/// - exactly one trailing `\n` or `\r\n` is removed.
///
/// Meant to be applied once over a whole accumulated buffer, not per chunk.
pub fn normalize(bytes: &[u8]) -> String {
    let decoded = String::from_utf8_lossy(bytes);
    let stripped = CONTROL_CHARS.replace_all(&decoded, "");
    strip_one_line_ending(&stripped).to_string()
}

/// Decode a single chunk for a progress callback, without any cleanup.
pub fn decode_chunk(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn strip_one_line_ending(text: &str) -> &str {
    match text.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => text,
    }
}
