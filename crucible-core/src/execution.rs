use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Terminal state of one execution attempt.
///
/// An invocation moves from pending to running and leaves running exactly
/// once, into one of these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ExecutionStatus {
    /// Built and exited with status zero.
    Success,
    /// Rejected, failed to build, or exited non-zero.
    Error,
    /// Killed at the effective deadline.
    Timeout,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

/// Outcome of a single execution attempt.
///
/// Every field is always populated; absent output is an empty string.
/// Failures of the submitted code are represented here rather than as
/// errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct RunResult {
    /// `true` only when `status` is [`ExecutionStatus::Success`].
    pub success: bool,
    /// Terminal state of the attempt.
    pub status: ExecutionStatus,
    /// Captured standard output of the program (or test report).
    pub stdout: String,
    /// Captured standard error of the program or toolchain.
    pub stderr: String,
    /// Human-readable failure description; empty on success.
    pub error: String,
    /// Wall-clock time spent building and running.
    pub duration: Duration,
}

impl RunResult {
    /// A clean run.
    #[must_use]
    pub fn succeeded(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            success: true,
            status: ExecutionStatus::Success,
            stdout,
            stderr,
            error: String::new(),
            duration,
        }
    }

    /// A build failure or non-zero exit.
    #[must_use]
    pub fn failed(error: String, stdout: String, stderr: String, duration: Duration) -> Self {
        Self { success: false, status: ExecutionStatus::Error, stdout, stderr, error, duration }
    }

    /// A run killed at its deadline.
    #[must_use]
    pub fn timed_out(error: String, stdout: String, stderr: String, duration: Duration) -> Self {
        Self { success: false, status: ExecutionStatus::Timeout, stdout, stderr, error, duration }
    }

    /// Input refused before any resource was touched.
    #[must_use]
    pub fn rejected(error: String) -> Self {
        Self::failed(error, String::new(), String::new(), Duration::ZERO)
    }
}
