// src/exec/router.rs

//! Routing of stdout/stderr chunks to callbacks and sinks.
//!
//! Each stream gets one [`StreamRoute`] per run, which can fan a chunk out
//! to a callback, a bounded sink and a chunk list at the same time. A route
//! with nothing attached is inactive and its pipe is never opened.

use crate::exec::control::ProcessControl;
use crate::exec::normalize::decode_chunk;
use crate::exec::options::{ChunkCallback, TextProgress};
use crate::exec::sink::{BoundedSink, ChunkSink};

/// Size of a single read from a child pipe.
pub(crate) const PIPE_CHUNK_SIZE: usize = 8192;

enum Callback {
    Text(TextProgress),
    Bytes(ChunkCallback),
}

/// Destinations for the chunks of one stream.
#[derive(Default)]
pub struct StreamRoute {
    callback: Option<Callback>,
    bounded: Option<BoundedSink>,
    chunks: Option<ChunkSink>,
}

impl StreamRoute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `f` with the decoded text of each chunk.
    pub fn with_progress(mut self, f: Option<TextProgress>) -> Self {
        self.callback = f.map(Callback::Text).or(self.callback);
        self
    }

    /// Call `f` with the raw bytes of each chunk.
    pub fn with_chunk_callback(mut self, f: Option<ChunkCallback>) -> Self {
        self.callback = f.map(Callback::Bytes).or(self.callback);
        self
    }

    /// Copy decoded text into a buffer of `capacity` bytes. Zero disables it.
    pub fn with_bounded(mut self, capacity: usize) -> Self {
        self.bounded = (capacity > 0).then(|| BoundedSink::with_capacity(capacity));
        self
    }

    /// Keep every raw chunk.
    pub fn with_chunks(mut self, enabled: bool) -> Self {
        self.chunks = enabled.then(ChunkSink::new);
        self
    }

    /// Whether anything wants this stream's output.
    pub fn is_active(&self) -> bool {
        self.callback.is_some() || self.bounded.is_some() || self.chunks.is_some()
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Deliver one chunk to every destination.
    pub fn dispatch(&mut self, chunk: &[u8], control: &ProcessControl) {
        let wants_text =
            self.bounded.is_some() || matches!(self.callback, Some(Callback::Text(_)));
        let text = if wants_text { Some(decode_chunk(chunk)) } else { None };

        match (&mut self.callback, text.as_deref()) {
            (Some(Callback::Text(f)), Some(text)) => f(text, control),
            (Some(Callback::Bytes(f)), _) => f(chunk, control),
            _ => {}
        }

        if let (Some(sink), Some(text)) = (self.bounded.as_mut(), text.as_deref()) {
            sink.write_str(text);
        }

        if let Some(sink) = self.chunks.as_mut() {
            sink.push(chunk);
        }
    }

    /// Normalized captured text, preferring the bounded sink. `None` when the
    /// stream was not captured.
    pub fn captured_text(&self) -> Option<String> {
        match (&self.bounded, &self.chunks) {
            (Some(sink), _) => Some(sink.text()),
            (None, Some(sink)) => Some(sink.text()),
            (None, None) => None,
        }
    }

    pub fn bounded(&self) -> Option<&BoundedSink> {
        self.bounded.as_ref()
    }

    pub fn chunks(&self) -> Option<&ChunkSink> {
        self.chunks.as_ref()
    }
}
