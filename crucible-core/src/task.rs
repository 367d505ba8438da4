use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::{LessonId, TaskId};

/// A practice task as supplied by the content store.
///
/// Tasks are read-only to the execution core. A task may carry a test
/// harness, an expected output, required code patterns, or any combination;
/// a task with none of them passes as soon as the submission runs cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Task {
    /// Unique identifier for this task.
    pub id: TaskId,
    /// Lesson whose practice this task completes.
    pub lesson_id: LessonId,
    /// Markdown prompt shown to the learner.
    #[serde(default)]
    pub prompt_md: String,
    /// Code the learner's editor starts from.
    #[serde(default)]
    pub starter_code: String,
    /// Test harness compiled against the submission, if any.
    #[serde(default)]
    pub tests_source: Option<String>,
    /// Output the program must print, if any.
    #[serde(default)]
    pub expected_output: Option<String>,
    /// Substrings that must appear in the submitted code.
    #[serde(default)]
    pub required_patterns: Vec<String>,
    /// Points credited to the lesson on a passing submission.
    #[serde(default)]
    pub points: u32,
}

impl Task {
    /// Create a task with no harness, expectations or prompt.
    #[must_use]
    pub fn new(id: TaskId, lesson_id: LessonId, points: u32) -> Self {
        Self {
            id,
            lesson_id,
            prompt_md: String::new(),
            starter_code: String::new(),
            tests_source: None,
            expected_output: None,
            required_patterns: Vec::new(),
            points,
        }
    }

    /// Set the markdown prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt_md: impl Into<String>) -> Self {
        self.prompt_md = prompt_md.into();
        self
    }

    /// Set the starter code.
    #[must_use]
    pub fn with_starter_code(mut self, code: impl Into<String>) -> Self {
        self.starter_code = code.into();
        self
    }

    /// Attach a test harness.
    #[must_use]
    pub fn with_tests(mut self, tests_source: impl Into<String>) -> Self {
        self.tests_source = Some(tests_source.into());
        self
    }

    /// Require the program to print `output`.
    #[must_use]
    pub fn with_expected_output(mut self, output: impl Into<String>) -> Self {
        self.expected_output = Some(output.into());
        self
    }

    /// Require `pattern` to appear in the submitted code.
    #[must_use]
    pub fn with_required_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.required_patterns.push(pattern.into());
        self
    }

    /// Returns the harness source if the task has a non-blank one.
    #[must_use]
    pub fn harness(&self) -> Option<&str> {
        self.tests_source.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Check the task definition for values the verifier cannot act on.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidTaskId`] for an empty id, or
    /// [`CoreError::TaskValidation`] for an empty required pattern.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.id.as_str().trim().is_empty() {
            return Err(CoreError::InvalidTaskId { reason: "id must not be empty".to_owned() });
        }
        if let Some(i) = self.required_patterns.iter().position(String::is_empty) {
            return Err(CoreError::TaskValidation {
                field: format!("required_patterns[{i}]"),
                reason: "pattern must not be empty".to_owned(),
            });
        }
        Ok(())
    }
}
