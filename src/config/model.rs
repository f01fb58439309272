// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::RunMode;

/// Configuration as read from a TOML file.
///
/// ```toml
/// [defaults]
/// cwd = "/tmp"
/// max_buffer = 20480
/// mode = "buffered"
/// timeout = "30s"
///
/// [defaults.env]
/// FOO = "bar"
/// ```
///
/// Every key is optional. Validation into [`ConfigFile`] happens through
/// `TryFrom`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub defaults: RawDefaults,
}

/// `[defaults]` section, unvalidated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDefaults {
    /// Working directory for the command.
    #[serde(default)]
    pub cwd: Option<String>,

    /// Capacity of each bounded output buffer, in bytes.
    #[serde(default)]
    pub max_buffer: Option<usize>,

    /// `"buffered"` or `"streaming"`.
    #[serde(default)]
    pub mode: Option<RunMode>,

    /// Time limit such as `"30s"`; the run is cancelled when it passes.
    #[serde(default)]
    pub timeout: Option<String>,

    /// Extra environment variables for the child.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Validated configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub defaults: Defaults,
}

/// Validated `[defaults]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defaults {
    pub cwd: Option<PathBuf>,
    pub max_buffer: Option<usize>,
    pub mode: RunMode,
    pub timeout: Option<Duration>,
    pub env: BTreeMap<String, String>,
}
