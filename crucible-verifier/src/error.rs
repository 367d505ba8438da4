//! Error types for the verifier crate.

use crucible_core::TaskId;

/// Failure reported by a collaborator (content store, submission log,
/// progress ledger).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Errors that prevent a verification from producing a verdict.
///
/// None of these are recorded as a submission: the learner is never
/// penalised for host-side failures.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum VerifyError {
    /// No task with this id exists.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The content store failed while looking up the task.
    #[error("task lookup failed: {0}")]
    TaskStore(#[source] StoreError),

    /// The executor could not run the submission at all.
    #[error("executor error: {0}")]
    Executor(#[from] crucible_executor::ExecutorError),

    /// The submission could not be persisted.
    #[error("failed to save submission: {0}")]
    Persistence(#[source] StoreError),

    /// Progress could not be updated after a pass.
    #[error("failed to update progress: {0}")]
    Progress(#[source] StoreError),
}
