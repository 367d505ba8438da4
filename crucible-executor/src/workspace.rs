//! Ephemeral per-invocation directories.
//!
//! A [`Workspace`] is a uniquely named directory under a shared root. It is
//! removed by [`Workspace::release`] or, on any other exit path (early
//! return, timeout, panic, a dropped future), by `Drop`.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::ExecutorError;

/// Exclusively owned scratch directory for one execution attempt.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create `root/<prefix><random>`, creating `root` first if needed.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Workspace`] if either directory cannot be
    /// created (permissions, disk full).
    pub fn acquire(root: &Path, prefix: &str) -> Result<Self, ExecutorError> {
        let workspace_err = |source| ExecutorError::Workspace { root: root.to_owned(), source };

        std::fs::create_dir_all(root).map_err(workspace_err)?;
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(root)
            .map_err(workspace_err)?;

        tracing::debug!(workspace = %dir.path().display(), "workspace acquired");
        Ok(Self { dir })
    }

    /// Absolute path of the workspace directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `relative`, creating parent directories.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Io`] if the file cannot be written.
    pub async fn write_file(
        &self,
        relative: &str,
        contents: &str,
    ) -> Result<PathBuf, ExecutorError> {
        let full = self.dir.path().join(relative);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, contents).await?;
        Ok(full)
    }

    /// Remove the workspace tree.
    ///
    /// A tree that is already gone counts as released.
    ///
    /// # Errors
    /// Returns the I/O error if the tree exists but cannot be removed.
    pub fn release(self) -> io::Result<()> {
        let path = self.dir.path().to_owned();
        match self.dir.close() {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => {
                tracing::debug!(workspace = %path.display(), "workspace released");
                Ok(())
            }
        }
    }
}
