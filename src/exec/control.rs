// src/exec/control.rs

//! Limited handle on a running process, handed to progress callbacks.
//!
//! Callbacks never see the underlying `Child`. They can only queue requests
//! which the run loop applies between chunks.

use tokio::sync::mpsc;

/// Request queued by a [`ProcessControl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ControlRequest {
    Terminate,
    WriteStdin(Vec<u8>),
    CloseStdin,
}

/// Capability to terminate the process or feed its stdin.
///
/// All methods return `false` once the run has finished and the request can
/// no longer be delivered.
#[derive(Debug, Clone)]
pub struct ProcessControl {
    pid: Option<u32>,
    tx: mpsc::UnboundedSender<ControlRequest>,
}

impl ProcessControl {
    pub(crate) fn new(pid: Option<u32>, tx: mpsc::UnboundedSender<ControlRequest>) -> Self {
        Self { pid, tx }
    }

    /// OS process id of the shell running the command.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Ask for the process to be killed. This is not a cancellation: the run
    /// ends with a regular failure for the terminated process.
    pub fn terminate(&self) -> bool {
        self.tx.send(ControlRequest::Terminate).is_ok()
    }

    /// Queue bytes for the process's stdin.
    ///
    /// Writes are dropped if stdin was already closed, which is always the
    /// case when the run was started with input text.
    pub fn write_stdin(&self, bytes: impl Into<Vec<u8>>) -> bool {
        self.tx.send(ControlRequest::WriteStdin(bytes.into())).is_ok()
    }

    /// Close stdin once everything queued so far has been written.
    pub fn close_stdin(&self) -> bool {
        self.tx.send(ControlRequest::CloseStdin).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_queued_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let control = ProcessControl::new(Some(42), tx);

        assert_eq!(control.pid(), Some(42));
        assert!(control.write_stdin("y\n"));
        assert!(control.close_stdin());
        assert!(control.terminate());

        assert_eq!(rx.try_recv().ok(), Some(ControlRequest::WriteStdin(b"y\n".to_vec())));
        assert_eq!(rx.try_recv().ok(), Some(ControlRequest::CloseStdin));
        assert_eq!(rx.try_recv().ok(), Some(ControlRequest::Terminate));
    }

    #[test]
    fn requests_fail_after_run_is_over() {
        let (tx, rx) = mpsc::unbounded_channel();
        let control = ProcessControl::new(None, tx);
        drop(rx);

        assert!(!control.terminate());
        assert!(!control.write_stdin(Vec::new()));
    }
}
