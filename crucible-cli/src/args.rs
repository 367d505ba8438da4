//! Argument definitions.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use crucible_executor::{ExecutorConfig, ExecutorError};

/// Run and grade untrusted Rust programs.
#[derive(Debug, Parser)]
#[command(name = "crucible", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub limits: Limits,

    #[command(subcommand)]
    pub command: Command,
}

/// Limits taken from flags or, failing that, their `CRUCIBLE_*` variables.
///
/// Variables without a flag (`CRUCIBLE_MAX_OUTPUT_BYTES`, `CRUCIBLE_CARGO`)
/// are read by [`ExecutorConfig::from_env`].
#[derive(Debug, Default, Args)]
pub struct Limits {
    /// Execution ceiling in seconds.
    #[arg(
        long,
        global = true,
        env = "CRUCIBLE_RUN_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: Option<u64>,

    /// Maximum accepted source size in bytes.
    #[arg(
        long,
        global = true,
        env = "CRUCIBLE_MAX_CODE_SIZE",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub max_code_size: Option<u64>,

    /// Directory under which per-invocation workspaces are created.
    #[arg(long, global = true, env = "CRUCIBLE_WORKSPACE_ROOT")]
    pub workspace_root: Option<PathBuf>,
}

impl Limits {
    /// Resolve the executor configuration: environment first, then flags.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Config`] if an environment variable is invalid.
    pub fn resolve(&self) -> Result<ExecutorConfig, ExecutorError> {
        self.apply(ExecutorConfig::from_env()?)
    }

    /// Apply the flag overrides to `config`.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Config`] if `--max-code-size` does not fit
    /// in `usize`.
    pub fn apply(&self, mut config: ExecutorConfig) -> Result<ExecutorConfig, ExecutorError> {
        if let Some(secs) = self.timeout_secs {
            config = config.with_run_timeout(Duration::from_secs(secs));
        }
        if let Some(bytes) = self.max_code_size {
            let bytes = usize::try_from(bytes).map_err(|_| ExecutorError::Config {
                key: "--max-code-size".to_owned(),
                reason: format!("{bytes} does not fit in memory"),
            })?;
            config = config.with_max_code_size(bytes);
        }
        if let Some(root) = &self.workspace_root {
            config = config.with_workspace_root(root.clone());
        }
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build and run a program, reporting what it printed.
    Run {
        /// Source file holding the program's `main.rs`.
        file: PathBuf,
    },

    /// Build a program with a test harness and run the tests.
    Check {
        /// Source file holding the program's `main.rs`.
        file: PathBuf,

        /// Test harness compiled as a child module of the program.
        #[arg(long)]
        tests: PathBuf,
    },

    /// Grade a program against a task definition.
    Verify {
        /// Source file holding the program's `main.rs`.
        file: PathBuf,

        /// JSON array of task definitions.
        #[arg(long)]
        tasks: PathBuf,

        /// Identifier of the task to grade against.
        #[arg(long)]
        task: String,

        /// Compare output byte for byte instead of normalizing whitespace.
        #[arg(long)]
        exact: bool,
    },
}
