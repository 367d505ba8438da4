//! In-memory collaborators.
//!
//! Back the CLI and tests. Everything lives behind `RwLock`/`Mutex`, so a
//! single instance can be shared across concurrent verifications.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use crucible_core::{LessonId, Submission, Task, TaskId};
use serde::Serialize;

use crate::error::StoreError;
use crate::ports::{ProgressSink, SubmissionSink, TaskStore};

/// Task definitions held in a map.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl MemoryTaskStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON array of tasks.
    ///
    /// # Errors
    /// Returns [`StoreError::Corrupt`] if the JSON does not parse or a task
    /// fails validation.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let tasks: Vec<Task> =
            serde_json::from_str(json).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let store = Self::new();
        for task in tasks {
            store.insert(task)?;
        }
        Ok(store)
    }

    /// Add or replace a task.
    ///
    /// # Errors
    /// Returns [`StoreError::Corrupt`] if the task fails validation.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    pub fn insert(&self, task: Task) -> Result<(), StoreError> {
        task.validate().map_err(|e| StoreError::Corrupt(e.to_string()))?;
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.tasks
            .write()
            .expect("task store write lock poisoned")
            .insert(task.id.clone(), task);
        Ok(())
    }

    /// Number of stored tasks.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    pub fn len(&self) -> usize {
        self.tasks.read().expect("task store read lock poisoned").len()
    }

    /// Whether the store holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        let tasks = self
            .tasks
            .read()
            .map_err(|_| StoreError::Unavailable("task store lock poisoned".to_owned()))?;
        Ok(tasks.get(id).cloned())
    }
}

/// Append-only submission history.
#[derive(Debug, Default)]
pub struct MemorySubmissionLog {
    entries: Mutex<Vec<Submission>>,
}

impl MemorySubmissionLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored submission, oldest first.
    ///
    /// # Panics
    /// Panics if the internal `Mutex` is poisoned.
    #[must_use]
    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    pub fn all(&self) -> Vec<Submission> {
        self.entries.lock().expect("submission log lock poisoned").clone()
    }

    /// Submissions for one task, oldest first.
    #[must_use]
    pub fn for_task(&self, task: &TaskId) -> Vec<Submission> {
        self.all().into_iter().filter(|s| &s.task_id == task).collect()
    }
}

#[async_trait]
impl SubmissionSink for MemorySubmissionLog {
    async fn save_submission(&self, submission: &Submission) -> Result<(), StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("submission log lock poisoned".to_owned()))?
            .push(submission.clone());
        Ok(())
    }
}

/// Progress of one lesson.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LessonProgress {
    /// Practice completed at least once.
    pub practice_done: bool,
    /// Total points credited.
    pub points: u64,
}

/// Per-lesson progress ledger.
#[derive(Debug, Default)]
pub struct MemoryProgress {
    lessons: Mutex<HashMap<LessonId, LessonProgress>>,
}

impl MemoryProgress {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress recorded for `lesson`; zeroed if none.
    ///
    /// # Panics
    /// Panics if the internal `Mutex` is poisoned.
    #[must_use]
    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    pub fn lesson(&self, lesson: &LessonId) -> LessonProgress {
        self.lessons
            .lock()
            .expect("progress lock poisoned")
            .get(lesson)
            .copied()
            .unwrap_or_default()
    }

    fn update(
        &self,
        lesson: &LessonId,
        f: impl FnOnce(&mut LessonProgress),
    ) -> Result<(), StoreError> {
        let mut lessons = self
            .lessons
            .lock()
            .map_err(|_| StoreError::Unavailable("progress lock poisoned".to_owned()))?;
        f(lessons.entry(lesson.clone()).or_default());
        Ok(())
    }
}

#[async_trait]
impl ProgressSink for MemoryProgress {
    async fn mark_practice_done(&self, lesson: &LessonId) -> Result<(), StoreError> {
        self.update(lesson, |p| p.practice_done = true)
    }

    async fn credit_points(&self, lesson: &LessonId, points: u32) -> Result<(), StoreError> {
        self.update(lesson, |p| p.points += u64::from(points))
    }
}
