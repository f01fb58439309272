// src/exec/options.rs

//! Configuration structs for the entry points in [`crate::exec::facade`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::exec::cancel::CancellationSignal;
use crate::exec::control::ProcessControl;
use crate::exec::sink::DEFAULT_MAX_BUFFER;

/// Progress callback receiving decoded text of each chunk.
pub type TextProgress = Box<dyn FnMut(&str, &ProcessControl) + Send>;

/// Callback receiving the raw bytes of each chunk.
pub type ChunkCallback = Box<dyn FnMut(&[u8], &ProcessControl) + Send>;

/// Options understood by every entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Working directory; inherited when `None`.
    pub cwd: Option<PathBuf>,
    /// Variables merged over the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Text written to stdin, after which stdin is closed.
    pub input: Option<String>,
    /// Per-stream capture capacity for the buffered entry points.
    pub max_buffer: Option<usize>,
}

impl CommandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn max_buffer(mut self, bytes: usize) -> Self {
        self.max_buffer = Some(bytes);
        self
    }

    /// Capture capacity to use when the caller did not choose one.
    pub fn buffer_capacity(&self) -> usize {
        self.max_buffer.unwrap_or(DEFAULT_MAX_BUFFER)
    }
}

/// Normalized output of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Configuration for [`crate::exec::run_buffered`].
///
/// A capacity of zero turns capture of that stream off.
pub struct BufferedRun {
    pub options: CommandOptions,
    pub stdout_capacity: usize,
    pub stderr_capacity: usize,
    pub on_stdout: Option<TextProgress>,
    pub on_stderr: Option<TextProgress>,
    pub cancellation: Option<Arc<dyn CancellationSignal>>,
}

impl BufferedRun {
    /// Capture both streams with `options.max_buffer` bytes each (10 KiB by
    /// default).
    pub fn new(options: CommandOptions) -> Self {
        let capacity = options.buffer_capacity();
        Self {
            options,
            stdout_capacity: capacity,
            stderr_capacity: capacity,
            on_stdout: None,
            on_stderr: None,
            cancellation: None,
        }
    }

    pub fn capacities(mut self, stdout: usize, stderr: usize) -> Self {
        self.stdout_capacity = stdout;
        self.stderr_capacity = stderr;
        self
    }

    pub fn on_stdout(mut self, f: impl FnMut(&str, &ProcessControl) + Send + 'static) -> Self {
        self.on_stdout = Some(Box::new(f));
        self
    }

    pub fn on_stderr(mut self, f: impl FnMut(&str, &ProcessControl) + Send + 'static) -> Self {
        self.on_stderr = Some(Box::new(f));
        self
    }

    pub fn cancel_on(mut self, signal: impl CancellationSignal + 'static) -> Self {
        self.cancellation = Some(Arc::new(signal));
        self
    }
}

/// Configuration for [`crate::exec::run_streaming`].
///
/// Stderr is always accumulated so a failure can quote it; stdout only when
/// `collect_stdout` is set.
pub struct StreamingRun {
    pub options: CommandOptions,
    pub on_stdout: Option<ChunkCallback>,
    pub on_stderr: Option<ChunkCallback>,
    pub collect_stdout: bool,
    pub cancellation: Option<Arc<dyn CancellationSignal>>,
}

impl StreamingRun {
    pub fn new(options: CommandOptions) -> Self {
        Self {
            options,
            on_stdout: None,
            on_stderr: None,
            collect_stdout: false,
            cancellation: None,
        }
    }

    pub fn on_stdout(mut self, f: impl FnMut(&[u8], &ProcessControl) + Send + 'static) -> Self {
        self.on_stdout = Some(Box::new(f));
        self
    }

    pub fn on_stderr(mut self, f: impl FnMut(&[u8], &ProcessControl) + Send + 'static) -> Self {
        self.on_stderr = Some(Box::new(f));
        self
    }

    pub fn collect_stdout(mut self, collect: bool) -> Self {
        self.collect_stdout = collect;
        self
    }

    pub fn cancel_on(mut self, signal: impl CancellationSignal + 'static) -> Self {
        self.cancellation = Some(Arc::new(signal));
        self
    }

    pub fn cancel_on_shared(mut self, signal: Option<Arc<dyn CancellationSignal>>) -> Self {
        self.cancellation = signal;
        self
    }
}
