// src/exec/sink.rs

//! Output sinks that streams can be routed into.
//!
//! - [`BoundedSink`] keeps at most `capacity` bytes and silently drops the
//!   rest.
//! - [`ChunkSink`] keeps every raw chunk in arrival order.

use tracing::debug;

use crate::exec::normalize::normalize;

/// Default capacity for buffered capture of each stream: 10 KiB.
pub const DEFAULT_MAX_BUFFER: usize = 10 * 1024;

/// Fixed-capacity text buffer with a write cursor.
///
/// Writes past the capacity are truncated without raising an error. A write
/// is cut at the last UTF-8 character boundary that still fits, so the
/// buffer never holds a partial character.
#[derive(Debug, Clone)]
pub struct BoundedSink {
    buf: Vec<u8>,
    capacity: usize,
    truncated: bool,
}

impl BoundedSink {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity.min(DEFAULT_MAX_BUFFER)),
            capacity,
            truncated: false,
        }
    }

    /// Append `text` at the cursor. Returns the number of bytes written.
    ///
    /// Once a write has been cut, every later write is dropped whole, so the
    /// buffer stays a prefix of everything written.
    pub fn write_str(&mut self, text: &str) -> usize {
        let remaining = if self.truncated {
            0
        } else {
            self.capacity - self.buf.len()
        };
        let mut end = text.len().min(remaining);
        while !text.is_char_boundary(end) {
            end -= 1;
        }

        self.buf.extend_from_slice(&text.as_bytes()[..end]);

        if end < text.len() && !self.truncated {
            self.truncated = true;
            debug!(
                capacity = self.capacity,
                dropped = text.len() - end,
                "bounded output buffer full; dropping excess output"
            );
        }

        end
    }

    /// Bytes written so far.
    pub fn cursor(&self) -> usize {
        self.buf.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether any write was cut short.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Normalized contents.
    pub fn text(&self) -> String {
        normalize(&self.buf)
    }
}

/// Unbounded, ordered list of raw output chunks.
#[derive(Debug, Clone, Default)]
pub struct ChunkSink {
    chunks: Vec<Vec<u8>>,
}

impl ChunkSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.chunks.push(chunk.to_vec());
    }

    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    pub fn byte_len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// All chunks joined back into the original byte stream.
    pub fn concat(&self) -> Vec<u8> {
        self.chunks.concat()
    }

    /// Normalized text of the joined chunks.
    pub fn text(&self) -> String {
        normalize(&self.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_sink_truncates_silently() {
        let mut sink = BoundedSink::with_capacity(8);
        assert_eq!(sink.write_str("hello "), 6);
        assert_eq!(sink.write_str("world"), 2);
        assert_eq!(sink.write_str("!!"), 0);

        assert_eq!(sink.cursor(), 8);
        assert!(sink.is_truncated());
        assert_eq!(sink.text(), "hello wo");
    }

    #[test]
    fn bounded_sink_never_splits_a_character() {
        let mut sink = BoundedSink::with_capacity(5);
        // "aé" is 3 bytes, "éé" another 4: only one more "é" fits.
        assert_eq!(sink.write_str("aé"), 3);
        assert_eq!(sink.write_str("éé"), 2);
        assert_eq!(sink.as_bytes(), "aéé".as_bytes());
    }

    #[test]
    fn nothing_is_appended_after_a_cut() {
        let mut sink = BoundedSink::with_capacity(4);
        // The 4-byte character does not fit after "A 0"; the later space
        // would, but must not be glued on after the gap.
        assert_eq!(sink.write_str("A 0\u{17000}"), 3);
        assert_eq!(sink.write_str(" "), 0);
        assert_eq!(sink.as_bytes(), b"A 0");
        assert!(sink.is_truncated());
    }

    #[test]
    fn bounded_sink_within_capacity_is_not_truncated() {
        let mut sink = BoundedSink::with_capacity(DEFAULT_MAX_BUFFER);
        sink.write_str("ok\n");
        assert!(!sink.is_truncated());
        assert_eq!(sink.text(), "ok");
    }

    #[test]
    fn zero_capacity_drops_everything() {
        let mut sink = BoundedSink::with_capacity(0);
        assert_eq!(sink.write_str("x"), 0);
        assert_eq!(sink.text(), "");
    }

    #[test]
    fn chunk_sink_keeps_order_and_raw_bytes() {
        let mut sink = ChunkSink::new();
        sink.push(b"first ");
        sink.push(&[0xe2, 0x82]);
        sink.push(&[0xac, b'\n']);

        assert_eq!(sink.chunks().len(), 3);
        assert_eq!(sink.byte_len(), 10);
        // the euro sign split across chunks survives concatenation
        assert_eq!(sink.text(), "first €");
    }
}
