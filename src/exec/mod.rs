// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs shell command lines with `tokio::process::Command`, routes their
//! output and turns the way they end into a `Result`.
//!
//! - [`launcher`] spawns the shell and prepares the environment.
//! - [`normalize`] turns captured bytes into clean text.
//! - [`sink`] holds the bounded and unbounded output sinks.
//! - [`router`] fans each chunk out to callbacks and sinks.
//! - [`control`] is the limited process handle given to callbacks.
//! - [`cancel`] connects an external cancellation signal to the run.
//! - [`arbiter`] decides between success, failure and cancellation.
//! - [`runner`] is the per-run loop tying all of the above together.
//! - [`facade`] exposes the buffered and streaming entry points.

pub mod arbiter;
pub mod cancel;
pub mod control;
pub mod facade;
pub mod launcher;
pub mod normalize;
pub mod options;
pub mod router;
mod runner;
pub mod sink;

pub use cancel::{CancellationListener, CancellationSignal};
pub use control::ProcessControl;
pub use facade::{exec_buffered, exec_streaming, run_buffered, run_streaming};
pub use launcher::{Diagnostics, Launcher, TracingDiagnostics};
pub use normalize::normalize;
pub use options::{BufferedRun, CapturedOutput, CommandOptions, StreamingRun};
pub use sink::DEFAULT_MAX_BUFFER;
