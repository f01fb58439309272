// src/exec/runner.rs

//! The run loop for a single command.
//!
//! Launches the process, pumps its routed streams, applies control and
//! cancellation requests, and hands the close over to the arbiter. Reads,
//! callbacks and sink writes all happen inside one `select!` loop, so the
//! sinks are only ever touched from one place.

use std::io;
use std::process::ExitStatus;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{ExecError, command_preview};
use crate::exec::arbiter::{CloseEvent, FailureContext, arbitrate};
use crate::exec::cancel::{CancellationBridge, CancellationSignal};
use crate::exec::control::{ControlRequest, ProcessControl};
use crate::exec::launcher::{LaunchSpec, Launcher};
use crate::exec::options::CommandOptions;
use crate::exec::router::{PIPE_CHUNK_SIZE, StreamRoute};

/// Everything one run needs.
pub(crate) struct Execution<'a> {
    pub command: &'a str,
    pub options: &'a CommandOptions,
    pub stdout: StreamRoute,
    pub stderr: StreamRoute,
    pub cancellation: Option<&'a dyn CancellationSignal>,
    pub stderr_handled: bool,
}

/// Routes handed back after a successful run, holding the captured output.
pub(crate) struct Routed {
    pub stdout: StreamRoute,
    pub stderr: StreamRoute,
}

/// Run `execution` to its terminal state.
///
/// The cancellation listener is released exactly once here, whichever way
/// the run ends.
pub(crate) async fn execute(
    launcher: &Launcher,
    execution: Execution<'_>,
) -> Result<Routed, ExecError> {
    let mut bridge = CancellationBridge::attach(execution.cancellation);
    let result = supervise(launcher, execution, &mut bridge).await;
    bridge.release();
    result
}

async fn supervise(
    launcher: &Launcher,
    execution: Execution<'_>,
    bridge: &mut CancellationBridge<'_>,
) -> Result<Routed, ExecError> {
    let Execution {
        command,
        options,
        mut stdout,
        mut stderr,
        stderr_handled,
        ..
    } = execution;
    let preview = command_preview(command);

    if bridge.is_requested() {
        info!(command = %preview, "cancellation already requested; not launching");
        return Err(ExecError::Cancelled);
    }

    let spec = LaunchSpec {
        options,
        pipe_stdin: options.input.is_some() || stdout.has_callback() || stderr.has_callback(),
        pipe_stdout: stdout.is_active(),
        pipe_stderr: stderr.is_active(),
    };
    let mut child = launcher.spawn(command, &spec)?;
    let pid = child.id();

    info!(command = %preview, pid = ?pid, "starting process");

    let (control_tx, mut control_rx) = mpsc::unbounded_channel();
    let control = ProcessControl::new(pid, control_tx);
    let mut stdin_tx = attach_stdin(&mut child, options.input.as_deref());

    let mut out_pipe = child.stdout.take();
    let mut err_pipe = child.stderr.take();
    let mut out_buf = vec![0_u8; PIPE_CHUNK_SIZE];
    let mut err_buf = vec![0_u8; PIPE_CHUNK_SIZE];

    let mut status: Option<ExitStatus> = None;
    let mut terminated = false;

    // The process counts as closed once it exited and both routed pipes hit
    // EOF. After a kill we stop waiting for EOF: grandchildren may still
    // hold the pipes open.
    loop {
        if status.is_some() && out_pipe.is_none() && err_pipe.is_none() {
            break;
        }

        tokio::select! {
            read = read_some(&mut out_pipe, &mut out_buf), if out_pipe.is_some() => {
                match read? {
                    0 => out_pipe = None,
                    n => stdout.dispatch(&out_buf[..n], &control),
                }
            }

            read = read_some(&mut err_pipe, &mut err_buf), if err_pipe.is_some() => {
                match read? {
                    0 => err_pipe = None,
                    n => stderr.dispatch(&err_buf[..n], &control),
                }
            }

            Some(request) = control_rx.recv() => {
                if apply_control(request, &mut child, &mut stdin_tx) {
                    terminated = true;
                    if status.is_some() {
                        break;
                    }
                }
            }

            _ = bridge.kill_requested() => {
                info!(command = %preview, pid = ?pid, "cancellation requested; terminating process");
                if let Err(err) = child.start_kill() {
                    debug!(pid = ?pid, error = %err, "could not kill process on cancellation");
                }
                if status.is_some() {
                    break;
                }
            }

            exit = child.wait(), if status.is_none() => {
                status = Some(exit?);
                if terminated || bridge.is_requested() {
                    break;
                }
            }
        }
    }

    drop(stdin_tx);

    let Some(status) = status else {
        return Err(ExecError::Io(io::Error::other("process closed without exit status")));
    };
    let close = CloseEvent::from_status(status);

    let resolution = arbitrate(
        close,
        bridge.is_requested(),
        FailureContext {
            command,
            stderr: stderr.captured_text(),
            stderr_handled,
        },
    );

    info!(
        command = %preview,
        pid = ?pid,
        exit_code = ?close.code,
        signal = ?close.signal,
        outcome = resolution.label(),
        "process closed"
    );

    resolution.into_result()?;
    Ok(Routed { stdout, stderr })
}

async fn read_some<R>(pipe: &mut Option<R>, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match pipe {
        Some(pipe) => pipe.read(buf).await,
        None => std::future::pending().await,
    }
}

/// Apply a control request. Returns `true` if the process was asked to die.
fn apply_control(
    request: ControlRequest,
    child: &mut Child,
    stdin_tx: &mut Option<mpsc::UnboundedSender<Vec<u8>>>,
) -> bool {
    match request {
        ControlRequest::Terminate => {
            debug!(pid = ?child.id(), "terminate requested by callback");
            if let Err(err) = child.start_kill() {
                debug!(error = %err, "could not kill process");
            }
            true
        }
        ControlRequest::WriteStdin(bytes) => {
            let delivered = stdin_tx.as_ref().is_some_and(|tx| tx.send(bytes).is_ok());
            if !delivered {
                debug!("stdin is closed; dropping write");
            }
            false
        }
        ControlRequest::CloseStdin => {
            stdin_tx.take();
            false
        }
    }
}

/// Hand stdin to a writer task. With `input`, the text is written and stdin
/// closed right away; otherwise a sender is returned for later writes.
fn attach_stdin(
    child: &mut Child,
    input: Option<&str>,
) -> Option<mpsc::UnboundedSender<Vec<u8>>> {
    let stdin = child.stdin.take()?;
    let (tx, rx) = mpsc::unbounded_channel();
    spawn_stdin_writer(stdin, rx);

    match input {
        Some(text) => {
            // Dropping `tx` right after closes stdin once the text is written.
            let _ = tx.send(text.as_bytes().to_vec());
            None
        }
        None => Some(tx),
    }
}

fn spawn_stdin_writer(mut stdin: ChildStdin, mut rx: mpsc::UnboundedReceiver<Vec<u8>>) {
    tokio::spawn(async move {
        while let Some(bytes) = rx.recv().await {
            if let Err(err) = stdin.write_all(&bytes).await {
                if err.kind() == io::ErrorKind::BrokenPipe {
                    debug!("process closed stdin before all input was written");
                } else {
                    warn!(error = %err, "failed to write to process stdin");
                }
                return;
            }
        }

        if let Err(err) = stdin.shutdown().await {
            debug!(error = %err, "failed to flush process stdin");
        }
    });
}
