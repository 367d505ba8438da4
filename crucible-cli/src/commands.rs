//! Command execution.

use std::path::Path;
use std::sync::Arc;

use crucible_core::TaskId;
use crucible_executor::{CodeExecutor, ExecutorConfig, LocalExecutor};
use crucible_verifier::{
    MemoryProgress, MemorySubmissionLog, MemoryTaskStore, OutputMatch, TaskStore, Verifier,
    VerifierConfig,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::args::Command;
use crate::error::CliError;

/// Result of a completed command.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// JSON document printed on stdout.
    pub report: Value,
    /// Whether the program ran cleanly (or, for `verify`, passed).
    pub passed: bool,
}

impl Outcome {
    /// `0` on success, `1` on a failed run or verdict.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.passed)
    }
}

/// Execute `command` with `config`.
///
/// # Errors
/// Returns [`CliError`] when an input cannot be read or an infrastructure
/// failure prevents a result. Failing programs are reported through
/// [`Outcome`], not as errors.
pub async fn execute(command: Command, config: ExecutorConfig) -> Result<Outcome, CliError> {
    let executor = LocalExecutor::new(config);
    match command {
        Command::Run { file } => {
            let code = read(&file).await?;
            let result = executor.run(&code, None).await?;
            Ok(Outcome { passed: result.success, report: serde_json::to_value(&result)? })
        }
        Command::Check { file, tests } => {
            let code = read(&file).await?;
            let tests = read(&tests).await?;
            let result = executor.check(&code, &tests, None).await?;
            Ok(Outcome { passed: result.success, report: serde_json::to_value(&result)? })
        }
        Command::Verify { file, tasks, task, exact } => {
            let code = read(&file).await?;
            verify(executor, &tasks, &task, &code, exact).await
        }
    }
}

async fn verify(
    executor: LocalExecutor,
    tasks_path: &Path,
    task: &str,
    code: &str,
    exact: bool,
) -> Result<Outcome, CliError> {
    let task_id = TaskId::new(task)?;
    let tasks = MemoryTaskStore::from_json(&read(tasks_path).await?)
        .map_err(|source| CliError::Tasks { path: tasks_path.to_path_buf(), source })?;
    debug!(tasks = tasks.len(), path = %tasks_path.display(), "loaded tasks");
    let lesson = tasks
        .get_task(&task_id)
        .await
        .map_err(|source| CliError::Tasks { path: tasks_path.to_path_buf(), source })?
        .map(|t| t.lesson_id);

    let submissions = Arc::new(MemorySubmissionLog::new());
    let progress = Arc::new(MemoryProgress::new());
    let output_match = if exact { OutputMatch::Exact } else { OutputMatch::Normalized };
    let verifier = Verifier::new(executor, Arc::new(tasks), submissions.clone(), progress.clone())
        .with_config(VerifierConfig::default().with_output_match(output_match));

    let verdict = verifier.verify(&task_id, code).await?;
    let report = json!({
        "verdict": verdict,
        "submission": submissions.all().pop(),
        "progress": lesson.map(|l| progress.lesson(&l)),
    });
    Ok(Outcome { passed: verdict.pass, report })
}

async fn read(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}
