//! Orchestrates one grading attempt for a `(task, code)` pair.
//!
//! The recorded submission status follows the execution outcome
//! (`SubmissionStatus::from_execution`); the verdict carries pass or fail.

use std::sync::Arc;

use crucible_core::{CheckFailure, RunResult, Submission, Task, TaskId, Verdict};
use crucible_executor::CodeExecutor;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::compare::{first_missing_pattern, OutputMatch};
use crate::error::VerifyError;
use crate::ports::{ProgressSink, SubmissionSink, TaskStore};

/// Verifier settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct VerifierConfig {
    /// Comparison policy for expected output.
    pub output_match: OutputMatch,
}

impl VerifierConfig {
    /// Set the output comparison policy.
    #[must_use]
    pub fn with_output_match(mut self, output_match: OutputMatch) -> Self {
        self.output_match = output_match;
        self
    }
}

/// Runs submissions, grades them and records the outcome.
///
/// The executor is generic so tests can substitute a fake and deployments a
/// remote sandbox.
pub struct Verifier<E: CodeExecutor> {
    executor: E,
    tasks: Arc<dyn TaskStore>,
    submissions: Arc<dyn SubmissionSink>,
    progress: Arc<dyn ProgressSink>,
    config: VerifierConfig,
}

impl<E: CodeExecutor> Verifier<E> {
    /// Create a verifier with the default configuration.
    #[must_use]
    pub fn new(
        executor: E,
        tasks: Arc<dyn TaskStore>,
        submissions: Arc<dyn SubmissionSink>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self { executor, tasks, submissions, progress, config: VerifierConfig::default() }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: VerifierConfig) -> Self {
        self.config = config;
        self
    }

    /// Grade `code` against task `task_id`.
    ///
    /// # Errors
    /// See [`verify_with_deadline`](Self::verify_with_deadline).
    pub async fn verify(&self, task_id: &TaskId, code: &str) -> Result<Verdict, VerifyError> {
        self.verify_with_deadline(task_id, code, None).await
    }

    /// Grade `code` against task `task_id`, stopping at `deadline` if earlier
    /// than the executor's own ceiling.
    ///
    /// Every graded attempt, pass or fail, is saved as a submission. A pass
    /// also marks the lesson's practice done and credits the task's points.
    ///
    /// # Errors
    /// - [`VerifyError::TaskNotFound`] / [`VerifyError::TaskStore`] if the task
    ///   cannot be loaded
    /// - [`VerifyError::Executor`] on an infrastructure failure; nothing is
    ///   recorded
    /// - [`VerifyError::Persistence`] / [`VerifyError::Progress`] if recording
    ///   the outcome fails
    pub async fn verify_with_deadline(
        &self,
        task_id: &TaskId,
        code: &str,
        deadline: Option<Instant>,
    ) -> Result<Verdict, VerifyError> {
        let task = self
            .tasks
            .get_task(task_id)
            .await
            .map_err(VerifyError::TaskStore)?
            .ok_or_else(|| VerifyError::TaskNotFound(task_id.clone()))?;

        let run = match task.harness() {
            Some(tests) => self.executor.check(code, tests, deadline).await,
            None => self.executor.run(code, deadline).await,
        }
        .inspect_err(|e| {
            tracing::error!(task = %task.id, error = %e, "execution infrastructure failure");
        })?;

        let verdict = grade(&task, code, run, self.config.output_match);
        tracing::info!(
            task = %task.id,
            pass = verdict.pass,
            status = %verdict.run.status,
            detail = %verdict.detail,
            "submission graded"
        );

        let submission = Submission::record(task.id.clone(), code.to_owned(), &verdict);
        self.submissions
            .save_submission(&submission)
            .await
            .map_err(VerifyError::Persistence)?;

        if verdict.pass {
            self.progress
                .mark_practice_done(&task.lesson_id)
                .await
                .map_err(VerifyError::Progress)?;
            self.progress
                .credit_points(&task.lesson_id, task.points)
                .await
                .map_err(VerifyError::Progress)?;
        }

        Ok(verdict)
    }
}

/// Decide a verdict from an execution result and the task's expectations.
///
/// A failed execution fails immediately. Otherwise expected output is
/// checked first, then required patterns in order.
#[must_use]
pub fn grade(task: &Task, code: &str, run: RunResult, output_match: OutputMatch) -> Verdict {
    if !run.success {
        let error = run.error.clone();
        return Verdict::failed(run, CheckFailure::Execution { error });
    }

    if let Some(expected) = &task.expected_output {
        if !output_match.matches(expected, &run.stdout) {
            let failure = CheckFailure::OutputMismatch {
                expected: expected.clone(),
                actual: run.stdout.clone(),
            };
            return Verdict::failed(run, failure);
        }
    }

    if let Some(pattern) = first_missing_pattern(code, &task.required_patterns) {
        let failure = CheckFailure::MissingPattern { pattern: pattern.to_owned() };
        return Verdict::failed(run, failure);
    }

    Verdict::passed(run)
}
