#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use shellexec::exec::CommandOptions;
use tempfile::TempDir;

/// Builder for `CommandOptions` with an optional scratch working directory.
pub struct OptionsBuilder {
    options: CommandOptions,
    scratch: Option<TempDir>,
}

/// Options plus the scratch directory they point at. Keep this alive for
/// the whole run; dropping it deletes the directory.
pub struct BuiltOptions {
    pub options: CommandOptions,
    pub scratch: Option<TempDir>,
}

impl BuiltOptions {
    pub fn scratch_path(&self) -> Option<&Path> {
        self.scratch.as_ref().map(TempDir::path)
    }
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: CommandOptions::default(),
            scratch: None,
        }
    }

    /// Run in a fresh temporary directory.
    pub fn scratch_dir(mut self) -> Self {
        let dir = tempfile::tempdir().expect("failed to create scratch dir");
        self.options.cwd = Some(dir.path().to_path_buf());
        self.scratch = Some(dir);
        self
    }

    /// Write `contents` to `name` inside the scratch directory, creating the
    /// directory first if needed.
    pub fn with_file(mut self, name: &str, contents: &str) -> Self {
        if self.scratch.is_none() {
            self = self.scratch_dir();
        }
        let dir = self.scratch.as_ref().map(TempDir::path).expect("scratch dir exists");
        fs::write(dir.join(name), contents).expect("failed to write scratch file");
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.options.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.options.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn input(mut self, input: &str) -> Self {
        self.options.input = Some(input.to_string());
        self
    }

    pub fn max_buffer(mut self, bytes: usize) -> Self {
        self.options.max_buffer = Some(bytes);
        self
    }

    pub fn build(self) -> BuiltOptions {
        BuiltOptions {
            options: self.options,
            scratch: self.scratch,
        }
    }
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
