use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::execution::ExecutionStatus;
use crate::id::{ContentHash, SubmissionId, TaskId};
use crate::verdict::Verdict;

/// Stored status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum SubmissionStatus {
    /// Accepted but not yet graded.
    Pending,
    /// Built and ran to a clean exit.
    Success,
    /// Failed to build or failed at runtime.
    Error,
    /// Exceeded the execution deadline.
    Timeout,
}

impl SubmissionStatus {
    /// Status recorded for an execution outcome.
    ///
    /// Content checks do not affect it: a clean run that prints the wrong
    /// output is still [`SubmissionStatus::Success`]. The pass or fail lives
    /// in the [`Verdict`].
    #[must_use]
    pub fn from_execution(status: ExecutionStatus) -> Self {
        match status {
            ExecutionStatus::Success => Self::Success,
            ExecutionStatus::Error => Self::Error,
            ExecutionStatus::Timeout => Self::Timeout,
        }
    }
}

impl From<ExecutionStatus> for SubmissionStatus {
    fn from(status: ExecutionStatus) -> Self {
        Self::from_execution(status)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
            Self::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

/// Durable record of one graded attempt.
///
/// Submissions are append-only: created once per verification and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Submission {
    /// Unique identifier for this submission.
    pub id: SubmissionId,
    /// The task the code was submitted for.
    pub task_id: TaskId,
    /// The submitted source code.
    pub code: String,
    /// SHA-256 of `code`.
    pub code_hash: ContentHash,
    /// Final status.
    pub status: SubmissionStatus,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// When the submission was recorded.
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Record a graded attempt from its verdict.
    #[must_use]
    pub fn record(task_id: TaskId, code: String, verdict: &Verdict) -> Self {
        Self {
            id: SubmissionId::new(),
            task_id,
            code_hash: ContentHash::of(code.as_bytes()),
            code,
            status: SubmissionStatus::from_execution(verdict.run.status),
            stdout: verdict.run.stdout.clone(),
            stderr: verdict.run.stderr.clone(),
            created_at: Utc::now(),
        }
    }
}
