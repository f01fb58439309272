// src/config/validate.rs

use std::path::PathBuf;

use crate::config::model::{ConfigFile, Defaults, RawConfigFile, RawDefaults};
use crate::errors::{Result, ShellexecError};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ShellexecError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        Ok(ConfigFile {
            defaults: validate_defaults(raw.defaults)?,
        })
    }
}

fn validate_defaults(raw: RawDefaults) -> Result<Defaults> {
    let cwd = match raw.cwd {
        Some(cwd) if cwd.trim().is_empty() => {
            return Err(ShellexecError::ConfigError(
                "[defaults].cwd must not be empty".to_string(),
            ));
        }
        Some(cwd) => Some(PathBuf::from(cwd)),
        None => None,
    };

    if raw.max_buffer == Some(0) {
        return Err(ShellexecError::ConfigError(
            "[defaults].max_buffer must be >= 1 (got 0)".to_string(),
        ));
    }

    let timeout = raw
        .timeout
        .as_deref()
        .map(parse_duration)
        .transpose()
        .map_err(|e| ShellexecError::ConfigError(format!("[defaults].timeout: {e}")))?;

    Ok(Defaults {
        cwd,
        max_buffer: raw.max_buffer,
        mode: raw.mode.unwrap_or_default(),
        timeout,
        env: raw.env,
    })
}
