//! Verification engine for Crucible submissions.
//!
//! Composes an executor with task metadata: runs the code (or its test
//! harness), checks expected output and required patterns, then records
//! the submission and, on a pass, the learner's progress.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod compare;
pub mod error;
pub mod memory;
pub mod ports;
pub mod verifier;

pub use compare::{normalize, OutputMatch};
pub use error::{StoreError, VerifyError};
pub use memory::{LessonProgress, MemoryProgress, MemorySubmissionLog, MemoryTaskStore};
pub use ports::{ProgressSink, SubmissionSink, TaskStore};
pub use verifier::{grade, Verifier, VerifierConfig};
