//! Core types for the Crucible code execution and verification engine.
//!
//! Defines the fundamental domain types: tasks, execution results,
//! verdicts and submission records.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod examples;
pub mod execution;
pub mod id;
pub mod submission;
pub mod task;
pub mod verdict;

pub use error::CoreError;
pub use execution::{ExecutionStatus, RunResult};
pub use id::{ContentHash, LessonId, SubmissionId, TaskId};
pub use submission::{Submission, SubmissionStatus};
pub use task::Task;
pub use verdict::{CheckFailure, Verdict};
