//! Execution backend abstraction trait.
//!
//! Lets the verifier run against the local toolchain, a fake in tests, or a
//! remote sandbox without changing verification logic.

use async_trait::async_trait;
use crucible_core::RunResult;
use tokio::time::Instant;

use crate::ExecutorError;

/// Builds and runs submitted code, producing a [`RunResult`].
///
/// Implementations must be `Send + Sync`; calls are independent and may run
/// concurrently without limit.
///
/// # Cancel Safety
/// Dropping a returned future must terminate any child process and release
/// any workspace it created.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Build and run `code` as a standalone program.
    ///
    /// `deadline` is the caller's deadline, if any; implementations stop at
    /// the earlier of it and their own ceiling.
    ///
    /// # Errors
    /// Returns an [`ExecutorError`] only for host-side failures. Build errors,
    /// crashes and timeouts are reported inside the `RunResult`.
    async fn run(&self, code: &str, deadline: Option<Instant>) -> Result<RunResult, ExecutorError>;

    /// Build `code` together with the test harness `tests` and run the tests.
    ///
    /// # Errors
    /// As for [`run`](Self::run).
    async fn check(
        &self,
        code: &str,
        tests: &str,
        deadline: Option<Instant>,
    ) -> Result<RunResult, ExecutorError>;
}

#[async_trait]
impl<T: CodeExecutor + ?Sized> CodeExecutor for std::sync::Arc<T> {
    async fn run(&self, code: &str, deadline: Option<Instant>) -> Result<RunResult, ExecutorError> {
        (**self).run(code, deadline).await
    }

    async fn check(
        &self,
        code: &str,
        tests: &str,
        deadline: Option<Instant>,
    ) -> Result<RunResult, ExecutorError> {
        (**self).check(code, tests, deadline).await
    }
}
