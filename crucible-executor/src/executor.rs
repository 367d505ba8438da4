//! Local execution backend: builds and runs submissions with the host's cargo.
//!
//! Each invocation:
//! 1. Rejects oversized code before touching any resource
//! 2. Acquires a fresh [`Workspace`] and writes a standalone project into it
//! 3. Derives one deadline, `min(caller deadline, now + run_timeout)`
//! 4. Builds, then runs the produced executable, both bound to that deadline
//! 5. Classifies the outcome and releases the workspace
//!
//! See [`CodeExecutor`] for the error contract.

use std::process::ExitStatus;
use std::time::Duration;

use async_trait::async_trait;
use crucible_core::RunResult;
use tokio::time::Instant;

use crate::process::{self, Captured, Exit};
use crate::toolchain::{self, Mode};
use crate::workspace::Workspace;
use crate::{CodeExecutor, ExecutorConfig, ExecutorError};

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "crucible-run-";

/// Executes submissions with the local cargo toolchain.
///
/// Holds no mutable state; one instance can serve any number of concurrent
/// calls, each in its own workspace with its own child processes.
///
/// # Cancel Safety
/// Cancel safe. Dropping the future kills the running child's process group
/// and removes the workspace via its `Drop`.
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    config: ExecutorConfig,
}

impl LocalExecutor {
    /// Create an executor with the given limits and paths.
    #[must_use]
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// The configuration this executor was built with.
    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// A rejection result if `code` exceeds `max_code_size`.
    fn reject_oversized(&self, code: &str) -> Option<RunResult> {
        let max = self.config.max_code_size;
        (code.len() > max).then(|| {
            tracing::info!(bytes = code.len(), max, "rejecting oversized submission");
            RunResult::rejected(format!("code too large: {} bytes (max {max})", code.len()))
        })
    }

    async fn execute(
        &self,
        code: &str,
        harness: Option<&str>,
        deadline: Option<Instant>,
    ) -> Result<RunResult, ExecutorError> {
        if let Some(rejected) = self.reject_oversized(code) {
            return Ok(rejected);
        }

        let mode = if harness.is_some() { Mode::Check } else { Mode::Run };
        let started = Instant::now();
        let deadline = effective_deadline(deadline, started, self.config.run_timeout);

        let workspace = Workspace::acquire(&self.config.workspace_root, WORKSPACE_PREFIX)?;
        tracing::info!(
            mode = mode.as_str(),
            workspace = %workspace.path().display(),
            bytes = code.len(),
            "starting execution"
        );

        let result = self.execute_in(&workspace, code, harness, mode, deadline, started).await;

        let path = workspace.path().to_owned();
        if let Err(e) = workspace.release() {
            tracing::warn!(workspace = %path.display(), error = %e, "failed to remove workspace");
        }

        if let Ok(run) = &result {
            tracing::info!(
                mode = mode.as_str(),
                status = %run.status,
                elapsed_ms = run.duration.as_millis(),
                "execution complete"
            );
        }
        result
    }

    async fn execute_in(
        &self,
        workspace: &Workspace,
        code: &str,
        harness: Option<&str>,
        mode: Mode,
        deadline: Instant,
        started: Instant,
    ) -> Result<RunResult, ExecutorError> {
        toolchain::write_project(workspace, code, harness).await?;

        let limit = self.config.max_output_bytes;
        let cargo = self.config.cargo.clone();
        let build_cmd = toolchain::build_command(&cargo, workspace.path(), mode);
        let build = process::run_until(build_cmd, cargo, deadline, limit).await?;

        match build.exit {
            Exit::TimedOut => {
                tracing::debug!("deadline reached during build");
                return Ok(self.timed_out(String::new(), build.stderr.into_text(), started));
            }
            Exit::Completed(status) if !status.success() => {
                let stderr = build.stderr.into_text();
                let error =
                    if stderr.trim().is_empty() { describe_exit(status) } else { stderr.clone() };
                return Ok(RunResult::failed(error, String::new(), stderr, started.elapsed()));
            }
            Exit::Completed(_) => {}
        }

        let messages = build.stdout.into_text();
        let Some(executable) = toolchain::executable_for(&messages, mode) else {
            tracing::warn!(mode = mode.as_str(), "build succeeded without an executable artifact");
            return Ok(RunResult::failed(
                "toolchain produced no executable".to_owned(),
                String::new(),
                build.stderr.into_text(),
                started.elapsed(),
            ));
        };

        let exec_cmd = toolchain::exec_command(&executable, workspace.path(), mode);
        let run = process::run_until(exec_cmd, executable, deadline, limit).await?;
        Ok(self.classify(run, mode, started))
    }

    fn classify(&self, run: Captured, mode: Mode, started: Instant) -> RunResult {
        let stdout = run.stdout.into_text();
        let stderr = run.stderr.into_text();
        match run.exit {
            Exit::TimedOut => self.timed_out(stdout, stderr, started),
            Exit::Completed(status) if status.success() => {
                RunResult::succeeded(stdout, stderr, started.elapsed())
            }
            Exit::Completed(status) => {
                let error = failure_text(mode, &stdout, &stderr, status);
                RunResult::failed(error, stdout, stderr, started.elapsed())
            }
        }
    }

    fn timed_out(&self, stdout: String, stderr: String, started: Instant) -> RunResult {
        let error = format!("execution exceeded {:?}", self.config.run_timeout);
        RunResult::timed_out(error, stdout, stderr, started.elapsed())
    }
}

#[async_trait]
impl CodeExecutor for LocalExecutor {
    async fn run(&self, code: &str, deadline: Option<Instant>) -> Result<RunResult, ExecutorError> {
        self.execute(code, None, deadline).await
    }

    async fn check(
        &self,
        code: &str,
        tests: &str,
        deadline: Option<Instant>,
    ) -> Result<RunResult, ExecutorError> {
        self.execute(code, Some(tests), deadline).await
    }
}

/// The earlier of the caller's deadline and `now + ceiling`.
#[must_use]
pub fn effective_deadline(caller: Option<Instant>, now: Instant, ceiling: Duration) -> Instant {
    let ceiling = now + ceiling;
    caller.map_or(ceiling, |d| d.min(ceiling))
}

/// Error text for a program that exited non-zero.
///
/// Test runners print failing-test detail on stdout, so check mode prefers
/// stdout; run mode prefers stderr. Falls back to the exit status.
fn failure_text(mode: Mode, stdout: &str, stderr: &str, status: ExitStatus) -> String {
    let preferred = match mode {
        Mode::Check => [stdout, stderr],
        Mode::Run => [stderr, ""],
    };
    preferred
        .into_iter()
        .find(|s| !s.trim().is_empty())
        .map_or_else(|| describe_exit(status), str::to_owned)
}

fn describe_exit(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_owned(),
    }
}
