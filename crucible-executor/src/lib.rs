//! Sandboxed execution of submitted code for the Crucible engine.
//!
//! Handles workspace lifecycle, toolchain invocation under a hard deadline,
//! bounded output capture and outcome classification.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod config;
pub mod error;
pub mod executor;
mod process;
pub mod toolchain;
pub mod workspace;

pub use backend::CodeExecutor;
pub use config::{
    ExecutorConfig, DEFAULT_MAX_CODE_SIZE, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_RUN_TIMEOUT,
};
pub use error::ExecutorError;
pub use executor::{effective_deadline, LocalExecutor, WORKSPACE_PREFIX};
pub use workspace::Workspace;
