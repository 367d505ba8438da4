//! Interfaces to the collaborators around the verifier.
//!
//! The content store supplies tasks; the submission log and the progress
//! ledger consume verdicts. Implementations must be `Send + Sync` so one
//! verifier can serve concurrent requests.

use async_trait::async_trait;
use crucible_core::{LessonId, Submission, Task, TaskId};

use crate::error::StoreError;

/// Read access to task definitions.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Look up a task. `Ok(None)` means no such task.
    ///
    /// # Errors
    /// Returns a [`StoreError`] if the store itself fails.
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>, StoreError>;
}

/// Append-only log of graded submissions.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Store one submission.
    ///
    /// # Errors
    /// Returns a [`StoreError`] if the record cannot be written.
    async fn save_submission(&self, submission: &Submission) -> Result<(), StoreError>;
}

/// Per-lesson progress ledger.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Mark the lesson's practice as completed.
    ///
    /// # Errors
    /// Returns a [`StoreError`] if the ledger cannot be updated.
    async fn mark_practice_done(&self, lesson: &LessonId) -> Result<(), StoreError>;

    /// Credit `points` to the lesson.
    ///
    /// # Errors
    /// Returns a [`StoreError`] if the ledger cannot be updated.
    async fn credit_points(&self, lesson: &LessonId, points: u32) -> Result<(), StoreError>;
}
