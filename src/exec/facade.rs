// src/exec/facade.rs

//! Public entry points.
//!
//! Two families share the same run loop and differ in how output is kept:
//!
//! - buffered ([`run_buffered`], [`exec_buffered`]): each stream is copied
//!   into a bounded buffer, progress callbacks get decoded text;
//! - streaming ([`run_streaming`], [`exec_streaming`]): callbacks get raw
//!   chunks, chunks are kept in unbounded lists.
//!
//! The free functions use a default [`Launcher`]; the methods on `Launcher`
//! let callers inject their own diagnostics.

use std::sync::Arc;

use tracing::debug;

use crate::errors::{ExecError, command_preview};
use crate::exec::cancel::CancellationSignal;
use crate::exec::launcher::Launcher;
use crate::exec::options::{BufferedRun, CapturedOutput, CommandOptions, StreamingRun, TextProgress};
use crate::exec::router::StreamRoute;
use crate::exec::runner::{Execution, Routed, execute};

impl Launcher {
    /// Run `command` capturing both streams into bounded buffers.
    pub async fn run_buffered(
        &self,
        command: &str,
        run: BufferedRun,
    ) -> Result<CapturedOutput, ExecError> {
        let BufferedRun {
            options,
            stdout_capacity,
            stderr_capacity,
            on_stdout,
            on_stderr,
            cancellation,
        } = run;

        debug!(
            command = %command_preview(command),
            stdout_capacity,
            stderr_capacity,
            "buffered run"
        );

        let stderr_handled = on_stderr.is_some();
        let execution = Execution {
            command,
            options: &options,
            stdout: StreamRoute::new()
                .with_progress(on_stdout)
                .with_bounded(stdout_capacity),
            stderr: StreamRoute::new()
                .with_progress(on_stderr)
                .with_bounded(stderr_capacity),
            cancellation: cancellation.as_deref(),
            stderr_handled,
        };

        execute(self, execution).await.map(into_captured)
    }

    /// Run `command` forwarding raw chunks to the callbacks.
    pub async fn run_streaming(
        &self,
        command: &str,
        run: StreamingRun,
    ) -> Result<CapturedOutput, ExecError> {
        let StreamingRun {
            options,
            on_stdout,
            on_stderr,
            collect_stdout,
            cancellation,
        } = run;

        debug!(command = %command_preview(command), collect_stdout, "streaming run");

        let stderr_handled = on_stderr.is_some();
        let execution = Execution {
            command,
            options: &options,
            stdout: StreamRoute::new()
                .with_chunk_callback(on_stdout)
                .with_chunks(collect_stdout),
            stderr: StreamRoute::new()
                .with_chunk_callback(on_stderr)
                .with_chunks(true),
            cancellation: cancellation.as_deref(),
            stderr_handled,
        };

        execute(self, execution).await.map(into_captured)
    }

    /// Buffered run with capacity from `options.max_buffer` and an optional
    /// stdout progress callback.
    pub async fn exec_buffered(
        &self,
        command: &str,
        options: CommandOptions,
        progress: Option<TextProgress>,
    ) -> Result<CapturedOutput, ExecError> {
        let mut run = BufferedRun::new(options);
        run.on_stdout = progress;
        self.run_buffered(command, run).await
    }

    /// Streaming run keeping every chunk of both streams.
    pub async fn exec_streaming(
        &self,
        command: &str,
        options: CommandOptions,
        cancellation: Option<Arc<dyn CancellationSignal>>,
    ) -> Result<CapturedOutput, ExecError> {
        let run = StreamingRun::new(options)
            .collect_stdout(true)
            .cancel_on_shared(cancellation);
        self.run_streaming(command, run).await
    }
}

fn into_captured(routed: Routed) -> CapturedOutput {
    CapturedOutput {
        stdout: routed.stdout.captured_text().unwrap_or_default(),
        stderr: routed.stderr.captured_text().unwrap_or_default(),
    }
}

/// [`Launcher::run_buffered`] with the default launcher.
pub async fn run_buffered(command: &str, run: BufferedRun) -> Result<CapturedOutput, ExecError> {
    Launcher::default().run_buffered(command, run).await
}

/// [`Launcher::run_streaming`] with the default launcher.
pub async fn run_streaming(command: &str, run: StreamingRun) -> Result<CapturedOutput, ExecError> {
    Launcher::default().run_streaming(command, run).await
}

/// [`Launcher::exec_buffered`] with the default launcher.
pub async fn exec_buffered(
    command: &str,
    options: CommandOptions,
    progress: Option<TextProgress>,
) -> Result<CapturedOutput, ExecError> {
    Launcher::default().exec_buffered(command, options, progress).await
}

/// [`Launcher::exec_streaming`] with the default launcher.
pub async fn exec_streaming(
    command: &str,
    options: CommandOptions,
    cancellation: Option<Arc<dyn CancellationSignal>>,
) -> Result<CapturedOutput, ExecError> {
    Launcher::default().exec_streaming(command, options, cancellation).await
}
