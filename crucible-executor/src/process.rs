//! Child process supervision with a hard deadline and bounded capture.
//!
//! Every child leads its own process group. The whole group is killed once
//! the child exits, at the deadline, or when the supervising future is
//! dropped, so no descendant outlives the call or holds its pipes open.

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::ExecutorError;

/// How long to keep draining pipes after the child is gone.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

const READ_CHUNK: usize = 8 * 1024;

const TRUNCATION_MARKER: &str = "\n[output truncated]\n";

/// How a supervised child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Exit {
    /// The child exited on its own.
    Completed(ExitStatus),
    /// The deadline passed; the child was killed.
    TimedOut,
}

/// Bytes read from one stream, capped at the configured limit.
#[derive(Debug, Default)]
pub(crate) struct Bounded {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

impl Bounded {
    /// Lossy UTF-8 text, with a marker if bytes were discarded.
    pub fn into_text(self) -> String {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        if self.truncated {
            text.push_str(TRUNCATION_MARKER);
        }
        text
    }

    fn push(&mut self, chunk: &[u8], limit: usize) {
        let room = limit.saturating_sub(self.bytes.len());
        if chunk.len() > room {
            self.truncated = true;
        }
        self.bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }
}

/// Capture buffer shared between a reader task and its collector.
type Shared = Arc<Mutex<Bounded>>;

fn lock(shared: &Shared) -> MutexGuard<'_, Bounded> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything observed about one child process.
#[derive(Debug)]
pub(crate) struct Captured {
    pub exit: Exit,
    pub stdout: Bounded,
    pub stderr: Bounded,
}

/// Kills a child's process group, at the latest when dropped.
#[derive(Debug)]
struct GroupKill {
    pgid: Option<Pid>,
}

impl GroupKill {
    /// Guard for `child`, which must have been spawned with `process_group(0)`.
    fn of(child: &Child) -> Self {
        let pgid = child.id().and_then(|id| i32::try_from(id).ok()).map(Pid::from_raw);
        Self { pgid }
    }

    /// SIGKILL every process in the group. Later calls do nothing.
    fn kill(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };
        match killpg(pgid, Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => {
                tracing::warn!(pgid = pgid.as_raw(), error = %e, "failed to kill process group");
            }
        }
    }
}

impl Drop for GroupKill {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Spawn `command`, capture both streams, and kill it at `deadline`.
///
/// Dropping the returned future kills the child's whole process group.
///
/// # Errors
/// Returns [`ExecutorError::Spawn`] if the program cannot be started, or
/// [`ExecutorError::Io`] if waiting on it fails.
pub(crate) async fn run_until(
    mut command: Command,
    program: PathBuf,
    deadline: Instant,
    limit: usize,
) -> Result<Captured, ExecutorError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ExecutorError::Spawn { program: program.clone(), source })?;
    let mut group = GroupKill::of(&child);

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("stdout not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("stderr not piped"))?;

    let stdout_buf = Shared::default();
    let stderr_buf = Shared::default();
    let stdout_task = tokio::spawn(read_bounded(stdout, limit, Arc::clone(&stdout_buf)));
    let stderr_task = tokio::spawn(read_bounded(stderr, limit, Arc::clone(&stderr_buf)));

    let exit = match tokio::time::timeout_at(deadline, child.wait()).await {
        Ok(status) => {
            let status = status?;
            group.kill();
            Exit::Completed(status)
        }
        Err(_) => {
            group.kill();
            if let Err(e) = child.kill().await {
                tracing::warn!(
                    program = %program.display(),
                    error = %e,
                    "failed to reap child at deadline"
                );
            }
            Exit::TimedOut
        }
    };

    let grace = Instant::now() + DRAIN_GRACE;
    let stdout = collect(stdout_task, &stdout_buf, grace).await?;
    let stderr = collect(stderr_task, &stderr_buf, grace).await?;

    Ok(Captured { exit, stdout, stderr })
}

/// Read `reader` to EOF into `sink`, keeping at most `limit` bytes.
///
/// Bytes past the limit are read and dropped so the writer never blocks on
/// a full pipe.
async fn read_bounded<R>(mut reader: R, limit: usize, sink: Shared) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        lock(&sink).push(&chunk[..n], limit);
    }
}

/// Await a reader task until `grace`, then take whatever it captured.
///
/// A pipe still open at `grace` (held by a process that escaped the group)
/// ends the read early; the bytes already captured are kept.
async fn collect(
    mut task: JoinHandle<io::Result<()>>,
    sink: &Shared,
    grace: Instant,
) -> Result<Bounded, ExecutorError> {
    match tokio::time::timeout_at(grace, &mut task).await {
        Ok(Ok(read)) => read?,
        Ok(Err(join)) => return Err(ExecutorError::Io(io::Error::other(join))),
        Err(_) => {
            task.abort();
            tracing::warn!("output pipe still open after child exit; keeping partial capture");
        }
    }
    Ok(std::mem::take(&mut *lock(sink)))
}
