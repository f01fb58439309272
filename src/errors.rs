// src/errors.rs

//! Crate-wide error types and aliases.
//!
//! - [`ExecError`] is what a single command run resolves to when it does not
//!   succeed.
//! - [`ShellexecError`] covers the application around the execution layer
//!   (config loading, CLI wiring).

use std::borrow::Cow;
use std::io;

use thiserror::Error;

/// Commands longer than this many characters are shortened in error messages.
pub const COMMAND_PREVIEW_CHARS: usize = 50;

/// Failure of a single command run.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The OS refused to start the process (bad working directory, missing
    /// shell, permission denied). The platform error is passed through as-is.
    #[error(transparent)]
    Launch(io::Error),

    /// Cancellation was requested before the process closed. Takes
    /// precedence over whatever exit code the process reported.
    #[error("operation cancelled by user")]
    Cancelled,

    /// The process closed with a non-zero exit code or was killed by a signal.
    #[error("{message}")]
    NonZeroExit {
        /// Full human-readable message, including captured stderr if any.
        message: String,
        /// The command line that was run.
        command: String,
        /// Exit code, `None` when the process was terminated by a signal.
        code: Option<i32>,
        /// Terminating signal on Unix.
        signal: Option<i32>,
        /// Normalized stderr captured during the run.
        stderr: Option<String>,
        /// Whether the caller had its own stderr callback, in which case the
        /// stderr embedded in `message` is something it has already seen.
        stderr_handled: bool,
    },

    /// Reading from or waiting on the running process failed.
    #[error("I/O error while running process: {0}")]
    Io(#[from] io::Error),
}

impl ExecError {
    /// Build a [`ExecError::NonZeroExit`] with its message.
    pub fn non_zero_exit(
        command: &str,
        code: Option<i32>,
        signal: Option<i32>,
        stderr: Option<String>,
        stderr_handled: bool,
    ) -> Self {
        let preview = command_preview(command);
        let mut message = match (code, signal) {
            (Some(code), _) => format!("Process '{preview}' exited with code {code}"),
            (None, Some(signal)) => {
                format!("Process '{preview}' was terminated by signal {signal}")
            }
            (None, None) => format!("Process '{preview}' exited abnormally"),
        };
        if let Some(text) = stderr.as_deref().filter(|s| !s.is_empty()) {
            message.push_str("\nError: ");
            message.push_str(text);
        }

        ExecError::NonZeroExit {
            message,
            command: command.to_string(),
            code,
            signal,
            stderr,
            stderr_handled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecError::Cancelled)
    }

    /// Exit code of a failed process, if the failure came from one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::NonZeroExit { code, .. } => *code,
            _ => None,
        }
    }

    /// First line of the error message, without any embedded stderr.
    pub fn headline(&self) -> String {
        let full = self.to_string();
        full.lines().next().unwrap_or_default().to_string()
    }
}

/// Shorten a command for display: at most [`COMMAND_PREVIEW_CHARS`]
/// characters followed by `...` when anything was cut.
pub fn command_preview(command: &str) -> Cow<'_, str> {
    match command.char_indices().nth(COMMAND_PREVIEW_CHARS) {
        Some((cut, _)) => Cow::Owned(format!("{}...", &command[..cut])),
        None => Cow::Borrowed(command),
    }
}

/// Application-level errors (config, CLI).
#[derive(Error, Debug)]
pub enum ShellexecError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ShellexecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_commands_appear_verbatim() {
        let cmd = "git status --porcelain";
        assert_eq!(command_preview(cmd), cmd);

        let exactly_fifty = "a".repeat(COMMAND_PREVIEW_CHARS);
        assert_eq!(command_preview(&exactly_fifty), exactly_fifty.as_str());
    }

    #[test]
    fn long_commands_are_cut_with_ellipsis() {
        let cmd = format!("echo {}", "x".repeat(80));
        let preview = command_preview(&cmd);
        assert_eq!(preview.chars().count(), COMMAND_PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));
        assert!(cmd.starts_with(preview.trim_end_matches("...")));
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let cmd = "é".repeat(60);
        let preview = command_preview(&cmd);
        assert_eq!(preview, format!("{}...", "é".repeat(50)));
    }

    #[test]
    fn non_zero_exit_message_embeds_stderr() {
        let err = ExecError::non_zero_exit("make build", Some(2), None, Some("boom".into()), false);
        assert_eq!(err.to_string(), "Process 'make build' exited with code 2\nError: boom");
        assert_eq!(err.exit_code(), Some(2));
        assert_eq!(err.headline(), "Process 'make build' exited with code 2");
    }

    #[test]
    fn non_zero_exit_without_stderr_has_single_line() {
        let err = ExecError::non_zero_exit("false", Some(1), None, Some(String::new()), true);
        assert_eq!(err.to_string(), "Process 'false' exited with code 1");

        match err {
            ExecError::NonZeroExit { stderr_handled, signal, .. } => {
                assert!(stderr_handled);
                assert_eq!(signal, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn signal_termination_is_described() {
        let err = ExecError::non_zero_exit("sleep 10", None, Some(9), None, false);
        assert_eq!(err.to_string(), "Process 'sleep 10' was terminated by signal 9");
        assert_eq!(err.exit_code(), None);
    }

    #[test]
    fn cancelled_has_fixed_message() {
        let err = ExecError::Cancelled;
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "operation cancelled by user");
    }
}
