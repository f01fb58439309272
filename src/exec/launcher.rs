// src/exec/launcher.rs

//! Spawning commands through the platform shell.
//!
//! Commands are opaque command lines, so they always go through a shell
//! (`sh -c` / `cmd /C`) to get operators, quoting and multi-token commands
//! right.
//!
//! On Unix-like systems the launcher also makes sure `/usr/local/bin` is on
//! `PATH`. Processes started from a desktop session often inherit a PATH
//! without it, which hides tools installed there.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::process::Stdio;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::errors::{ExecError, command_preview};
use crate::exec::options::CommandOptions;

/// Directory appended to PATH when missing.
pub const LOCAL_BIN: &str = "/usr/local/bin";

static LOCAL_BIN_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|:)/usr/local/bin(:|$)").expect("PATH segment pattern is valid")
});

/// Receiver for launcher diagnostics.
pub trait Diagnostics: Send + Sync {
    fn warn(&self, message: &str);
}

/// Default diagnostics: forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, message: &str) {
        warn!("{message}");
    }
}

/// Operating system family the environment is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOs {
    Windows,
    Unix,
}

impl TargetOs {
    pub fn current() -> Self {
        if cfg!(windows) {
            TargetOs::Windows
        } else {
            TargetOs::Unix
        }
    }
}

/// Whether `path` contains `/usr/local/bin` as a whole `:`-separated
/// segment, ignoring case.
pub fn has_local_bin(path: &str) -> bool {
    LOCAL_BIN_SEGMENT.is_match(path)
}

/// Append `/usr/local/bin` to `PATH` in `env` when it is missing.
///
/// Returns whether `env` was changed. Windows environments are never touched.
/// A PATH that is not valid UTF-8 is checked lossily and extended in place.
pub fn fix_up_path(env: &mut BTreeMap<OsString, OsString>, target: TargetOs) -> bool {
    if target == TargetOs::Windows {
        return false;
    }

    match env.get_mut(OsStr::new("PATH")) {
        Some(path) if has_local_bin(&path.to_string_lossy()) => false,
        Some(path) if path.is_empty() => {
            path.push(LOCAL_BIN);
            true
        }
        Some(path) => {
            path.push(":");
            path.push(LOCAL_BIN);
            true
        }
        None => {
            env.insert(OsString::from("PATH"), OsString::from(LOCAL_BIN));
            true
        }
    }
}

/// What the run loop needs piped for one launch.
#[derive(Debug, Clone, Copy)]
pub struct LaunchSpec<'a> {
    pub options: &'a CommandOptions,
    pub pipe_stdin: bool,
    pub pipe_stdout: bool,
    pub pipe_stderr: bool,
}

/// Starts shell processes. Cheap to clone.
#[derive(Clone)]
pub struct Launcher {
    diagnostics: Arc<dyn Diagnostics>,
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new(Arc::new(TracingDiagnostics))
    }
}

impl std::fmt::Debug for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher").finish_non_exhaustive()
    }
}

impl Launcher {
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { diagnostics }
    }

    /// Environment the child will see: the current process environment with
    /// `overrides` applied and PATH fixed up. Inherited entries are kept
    /// byte for byte, valid UTF-8 or not.
    pub fn launch_env(
        &self,
        overrides: &BTreeMap<String, String>,
    ) -> BTreeMap<OsString, OsString> {
        self.prepare_env(std::env::vars_os(), overrides, TargetOs::current())
    }

    /// Merge `overrides` over `inherited` and fix up PATH for `target`.
    pub fn prepare_env(
        &self,
        inherited: impl IntoIterator<Item = (OsString, OsString)>,
        overrides: &BTreeMap<String, String>,
        target: TargetOs,
    ) -> BTreeMap<OsString, OsString> {
        let mut env: BTreeMap<OsString, OsString> = inherited.into_iter().collect();
        env.extend(
            overrides
                .iter()
                .map(|(k, v)| (OsString::from(k), OsString::from(v))),
        );

        if fix_up_path(&mut env, target) {
            self.diagnostics.warn(&format!(
                "PATH did not contain '{LOCAL_BIN}'; appending it for the child process"
            ));
        }

        env
    }

    /// Spawn `command` through the shell.
    pub fn spawn(&self, command: &str, spec: &LaunchSpec<'_>) -> Result<Child, ExecError> {
        // Build a shell command appropriate for the platform.
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(command);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(command);
            c
        };

        if let Some(cwd) = &spec.options.cwd {
            cmd.current_dir(cwd);
        }

        let env = self.launch_env(&spec.options.env);
        cmd.env_clear().envs(&env);

        cmd.stdin(piped_or_null(spec.pipe_stdin))
            .stdout(piped_or_null(spec.pipe_stdout))
            .stderr(piped_or_null(spec.pipe_stderr))
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(ExecError::Launch)?;

        debug!(
            command = %command_preview(command),
            pid = ?child.id(),
            "process launched"
        );

        Ok(child)
    }
}

fn piped_or_null(piped: bool) -> Stdio {
    if piped { Stdio::piped() } else { Stdio::null() }
}
