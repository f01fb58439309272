// src/exec/arbiter.rs

//! Deciding how a run ends.
//!
//! A run goes `Running -> {Succeeded, Failed, Cancelled}` exactly once. At
//! close the rules apply in this order:
//!
//! 1. cancellation requested at or before close: `Cancelled`, whatever the
//!    exit code;
//! 2. non-zero exit code: `Failed` with a [`ExecError::NonZeroExit`];
//! 3. otherwise `Succeeded`. A close without an exit code (death by signal)
//!    falls in here too.
//!
//! Launch and I/O errors never reach a close and are propagated as they are
//! by the run loop.

use std::process::ExitStatus;

use tracing::debug;

use crate::errors::ExecError;

/// Exit information reported when the process closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseEvent {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl CloseEvent {
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn signalled(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    pub fn from_status(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            signal: exit_signal(status),
        }
    }

    fn is_failure(&self) -> bool {
        self.code.is_some_and(|code| code != 0)
    }
}

#[cfg(unix)]
fn exit_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: ExitStatus) -> Option<i32> {
    None
}

/// Terminal state of a run.
#[derive(Debug)]
pub enum Resolution {
    Succeeded,
    Failed(ExecError),
    Cancelled,
}

impl Resolution {
    pub fn into_result(self) -> Result<(), ExecError> {
        match self {
            Resolution::Succeeded => Ok(()),
            Resolution::Failed(err) => Err(err),
            Resolution::Cancelled => Err(ExecError::Cancelled),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Succeeded => "succeeded",
            Resolution::Failed(_) => "failed",
            Resolution::Cancelled => "cancelled",
        }
    }
}

/// What a failure needs to describe itself.
#[derive(Debug, Clone)]
pub struct FailureContext<'a> {
    pub command: &'a str,
    /// Normalized stderr, when it was captured.
    pub stderr: Option<String>,
    /// Whether the caller had its own stderr callback.
    pub stderr_handled: bool,
}

/// Classify a close.
pub fn arbitrate(close: CloseEvent, cancel_requested: bool, failure: FailureContext<'_>) -> Resolution {
    if cancel_requested {
        return Resolution::Cancelled;
    }

    if close.is_failure() {
        return Resolution::Failed(ExecError::non_zero_exit(
            failure.command,
            close.code,
            close.signal,
            failure.stderr,
            failure.stderr_handled,
        ));
    }

    if close.code.is_none() {
        debug!(signal = ?close.signal, "process closed without an exit code");
    }

    Resolution::Succeeded
}
