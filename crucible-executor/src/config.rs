//! Executor configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ExecutorError;

/// Default limit on submitted source size: 100 KiB.
pub const DEFAULT_MAX_CODE_SIZE: usize = 100 * 1024;

/// Default ceiling on build plus run time.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(15);

/// Default per-stream capture limit: 1 MiB.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Limits and paths used by [`LocalExecutor`](crate::LocalExecutor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ExecutorConfig {
    /// Submissions longer than this many bytes are rejected unexecuted.
    pub max_code_size: usize,

    /// Hard ceiling on the time one invocation may spend building and running.
    pub run_timeout: Duration,

    /// Bytes retained per captured stream; the rest is discarded.
    pub max_output_bytes: usize,

    /// Directory under which per-invocation workspaces are created.
    pub workspace_root: PathBuf,

    /// The `cargo` binary, as a path or a name resolved on `PATH`.
    pub cargo: PathBuf,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_code_size: DEFAULT_MAX_CODE_SIZE,
            run_timeout: DEFAULT_RUN_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            workspace_root: std::env::temp_dir().join("crucible-workspaces"),
            cargo: PathBuf::from("cargo"),
        }
    }
}

impl ExecutorConfig {
    /// Defaults overridden by `CRUCIBLE_*` environment variables.
    ///
    /// Recognised keys: `CRUCIBLE_MAX_CODE_SIZE`, `CRUCIBLE_RUN_TIMEOUT_SECS`,
    /// `CRUCIBLE_MAX_OUTPUT_BYTES`, `CRUCIBLE_WORKSPACE_ROOT`, `CRUCIBLE_CARGO`.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Config`] if a numeric variable does not parse
    /// or is zero.
    pub fn from_env() -> Result<Self, ExecutorError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads values through `lookup`.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Config`] on a malformed numeric value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ExecutorError> {
        let mut config = Self::default();
        if let Some(v) = lookup("CRUCIBLE_MAX_CODE_SIZE") {
            config.max_code_size = parse_positive("CRUCIBLE_MAX_CODE_SIZE", &v)?;
        }
        if let Some(v) = lookup("CRUCIBLE_RUN_TIMEOUT_SECS") {
            let secs = parse_positive("CRUCIBLE_RUN_TIMEOUT_SECS", &v)?;
            config.run_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = lookup("CRUCIBLE_MAX_OUTPUT_BYTES") {
            config.max_output_bytes = parse_positive("CRUCIBLE_MAX_OUTPUT_BYTES", &v)?;
        }
        if let Some(v) = lookup("CRUCIBLE_WORKSPACE_ROOT") {
            config.workspace_root = PathBuf::from(v);
        }
        if let Some(v) = lookup("CRUCIBLE_CARGO") {
            config.cargo = PathBuf::from(v);
        }
        Ok(config)
    }

    /// Set the maximum accepted source size in bytes.
    #[must_use]
    pub fn with_max_code_size(mut self, bytes: usize) -> Self {
        self.max_code_size = bytes;
        self
    }

    /// Set the execution ceiling.
    #[must_use]
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Set the per-stream capture limit.
    #[must_use]
    pub fn with_max_output_bytes(mut self, bytes: usize) -> Self {
        self.max_output_bytes = bytes;
        self
    }

    /// Set the workspace root directory.
    #[must_use]
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    /// Set the cargo binary.
    #[must_use]
    pub fn with_cargo(mut self, cargo: impl Into<PathBuf>) -> Self {
        self.cargo = cargo.into();
        self
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, ExecutorError>
where
    T: std::str::FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let parsed: T = value.trim().parse().map_err(|e: T::Err| ExecutorError::Config {
        key: key.to_owned(),
        reason: format!("{value:?}: {e}"),
    })?;
    if parsed == T::default() {
        return Err(ExecutorError::Config {
            key: key.to_owned(),
            reason: "must be greater than zero".to_owned(),
        });
    }
    Ok(parsed)
}
