//! Error types for the CLI crate.

use std::path::PathBuf;

/// Errors that stop a command before it produces a result.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CliError {
    /// An input file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The task id argument was rejected.
    #[error("invalid task id: {0}")]
    TaskId(#[from] crucible_core::CoreError),

    /// The tasks file could not be loaded.
    #[error("cannot load tasks from {}: {source}", path.display())]
    Tasks {
        path: PathBuf,
        #[source]
        source: crucible_verifier::StoreError,
    },

    /// An error propagated from the executor layer.
    #[error("executor error: {0}")]
    Executor(#[from] crucible_executor::ExecutorError),

    /// An error propagated from the verifier layer.
    #[error("verification error: {0}")]
    Verify(#[from] crucible_verifier::VerifyError),

    /// The result could not be serialized.
    #[error("cannot encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// `1` is reserved for a graded failure; every error here exits `2`.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        2
    }
}
