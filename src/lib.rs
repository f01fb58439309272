// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::load_optional;
use crate::config::model::Defaults;
use crate::errors::ExecError;
use crate::exec::{BufferedRun, CommandOptions, Launcher, StreamingRun};
use crate::types::{RunMode, parse_duration};

/// Exit code used when the command was cancelled (Ctrl-C or timeout).
pub const CANCELLED_EXIT_CODE: i32 = 130;

/// Effective settings for one CLI run: config file defaults with CLI flags
/// applied on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub input: Option<String>,
    pub max_buffer: Option<usize>,
    pub mode: RunMode,
    pub timeout: Option<Duration>,
}

impl RunSettings {
    pub fn merge(args: &CliArgs, defaults: &Defaults) -> Result<Self> {
        let mut env = defaults.env.clone();
        env.extend(args.env.iter().cloned());

        let max_buffer = match args.max_buffer {
            Some(n) => Some(usize::try_from(n).context("--max-buffer does not fit in memory")?),
            None => defaults.max_buffer,
        };

        let timeout = match args.timeout.as_deref() {
            Some(s) => Some(parse_duration(s).map_err(|e| anyhow::anyhow!("--timeout: {e}"))?),
            None => defaults.timeout,
        };

        Ok(Self {
            cwd: args.cwd.clone().or_else(|| defaults.cwd.clone()),
            env,
            input: args.input.clone(),
            max_buffer,
            mode: args.mode.unwrap_or(defaults.mode),
            timeout,
        })
    }

    /// Options for the child. Stdin always gets closed after `input` (or
    /// immediately) so commands reading it do not wait on the terminal.
    pub fn command_options(&self) -> CommandOptions {
        CommandOptions {
            cwd: self.cwd.clone(),
            env: self.env.clone(),
            input: Some(self.input.clone().unwrap_or_default()),
            max_buffer: self.max_buffer,
        }
    }
}

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config loading and merging with CLI flags
/// - a cancellation token fed by Ctrl-C and the optional timeout
/// - the buffered or streaming runner
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_optional(args.config.as_deref())?;
    let settings = RunSettings::merge(&args, &cfg.defaults)?;
    let command = args.command_line();

    debug!(?settings, "effective settings");

    let token = CancellationToken::new();

    // Ctrl-C → cancel the run.
    {
        let token = token.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("Ctrl+C received; cancelling");
            token.cancel();
        });
    }

    if let Some(timeout) = settings.timeout {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            info!(?timeout, "timeout elapsed; cancelling");
            token.cancel();
        });
    }

    let launcher = Launcher::default();
    let options = settings.command_options();

    let result = match settings.mode {
        RunMode::Buffered => {
            let run = BufferedRun::new(options).cancel_on(token.clone());
            launcher.run_buffered(&command, run).await.map(|out| {
                if !out.stdout.is_empty() {
                    println!("{}", out.stdout);
                }
            })
        }
        RunMode::Streaming => {
            let run = StreamingRun::new(options)
                .on_stdout(|chunk, _| forward(&mut std::io::stdout(), chunk))
                .on_stderr(|chunk, _| forward(&mut std::io::stderr(), chunk))
                .cancel_on(token.clone());
            launcher.run_streaming(&command, run).await.map(|_| ())
        }
    };

    // Stop the timeout task from firing into a finished run.
    token.cancel();

    Ok(exit_code_for(result))
}

fn forward(out: &mut impl Write, chunk: &[u8]) {
    if let Err(e) = out.write_all(chunk).and_then(|()| out.flush()) {
        debug!(error = %e, "failed to forward output chunk");
    }
}

/// Map the outcome of a run to the CLI's exit code.
pub fn exit_code_for(result: std::result::Result<(), ExecError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(ExecError::Cancelled) => {
            eprintln!("shellexec: {}", ExecError::Cancelled);
            CANCELLED_EXIT_CODE
        }
        Err(ExecError::NonZeroExit { message, code, .. }) => {
            eprintln!("shellexec: {message}");
            code.unwrap_or(1)
        }
        Err(err) => {
            eprintln!("shellexec: {err}");
            1
        }
    }
}
