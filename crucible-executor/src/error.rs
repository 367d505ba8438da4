//! Error types for the executor crate.
//!
//! These are infrastructure failures only. A submission that fails to
//! build, crashes or times out is a [`crucible_core::RunResult`], not an
//! error.

use std::path::PathBuf;

/// Host-side failures that prevent an execution attempt from happening.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutorError {
    /// The workspace directory could not be created.
    #[error("could not create workspace under {}: {source}", root.display())]
    Workspace {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The toolchain or produced program could not be started.
    #[error("failed to spawn {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value was malformed.
    #[error("invalid configuration {key}: {reason}")]
    Config { key: String, reason: String },

    /// Underlying I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
