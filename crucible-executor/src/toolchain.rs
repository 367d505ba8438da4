//! The cargo toolchain: project layout, build command, artifact discovery.
//!
//! A submission is materialised as a standalone single-binary package with
//! no dependencies. Building and running are separate steps so that the
//! deadline kill lands on the learner's program rather than on a `cargo run`
//! wrapper that would leave it orphaned.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::process::Command;

use crate::workspace::Workspace;
use crate::ExecutorError;

/// Package and binary name used for every submission.
pub const PACKAGE_NAME: &str = "submission";

const MANIFEST: &str = r#"[package]
name = "submission"
version = "0.1.0"
edition = "2021"
publish = false

[[bin]]
name = "submission"
path = "src/main.rs"

[profile.dev]
debug = false
incremental = false

[workspace]
"#;

/// Appended to `main.rs` in check mode so the harness is compiled as a
/// child module and can reach the submission's items through `super::*`.
const HARNESS_MOUNT: &str = "\n\n#[cfg(test)]\n#[path = \"harness.rs\"]\nmod harness;\n";

/// Which toolchain mode an invocation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Build the binary and run it.
    Run,
    /// Build the test harness and run it.
    Check,
}

impl Mode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Check => "check",
        }
    }

    /// Arguments passed to the produced executable.
    fn exec_args(self) -> &'static [&'static str] {
        match self {
            Self::Run => &[],
            Self::Check => &["--color", "never"],
        }
    }
}

/// Write the manifest, the submission and (in check mode) the harness.
///
/// # Errors
/// Returns [`ExecutorError::Io`] if any file cannot be written.
pub(crate) async fn write_project(
    workspace: &Workspace,
    code: &str,
    harness: Option<&str>,
) -> Result<(), ExecutorError> {
    workspace.write_file("Cargo.toml", MANIFEST).await?;
    match harness {
        Some(tests) => {
            let mut main = String::with_capacity(code.len() + HARNESS_MOUNT.len());
            main.push_str(code);
            main.push_str(HARNESS_MOUNT);
            workspace.write_file("src/main.rs", &main).await?;
            workspace.write_file("src/harness.rs", tests).await?;
        }
        None => {
            workspace.write_file("src/main.rs", code).await?;
        }
    }
    Ok(())
}

/// `cargo build` for the project in `workspace`.
///
/// Artifacts go to a target directory inside the workspace. Machine-readable
/// messages are printed on stdout; human-readable diagnostics on stderr.
pub(crate) fn build_command(cargo: &Path, workspace: &Path, mode: Mode) -> Command {
    let mut cmd = Command::new(cargo);
    cmd.arg("build")
        .arg("--quiet")
        .arg("--offline")
        .arg("--color")
        .arg("never")
        .arg("--message-format=json-render-diagnostics")
        .arg("--manifest-path")
        .arg(workspace.join("Cargo.toml"));
    if mode == Mode::Check {
        cmd.arg("--tests");
    }
    cmd.current_dir(workspace)
        .env("CARGO_TARGET_DIR", workspace.join("target"))
        .env("CARGO_TERM_COLOR", "never")
        .env_remove("RUSTC_WRAPPER")
        .env_remove("RUSTFLAGS")
        .env_remove("CARGO_ENCODED_RUSTFLAGS");
    cmd
}

/// Command running a built executable inside `workspace`.
pub(crate) fn exec_command(executable: &Path, workspace: &Path, mode: Mode) -> Command {
    let mut cmd = Command::new(executable);
    cmd.args(mode.exec_args()).current_dir(workspace);
    cmd
}

#[derive(Debug, Deserialize)]
struct CargoMessage {
    reason: String,
    #[serde(default)]
    target: Option<Target>,
    #[serde(default)]
    profile: Option<Profile>,
    #[serde(default)]
    executable: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Target {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Profile {
    test: bool,
}

/// Find the executable for `mode` in cargo's JSON message stream.
///
/// Lines that are not JSON or not artifact messages are skipped.
#[must_use]
pub fn find_executable(messages: &str, want_test: bool) -> Option<PathBuf> {
    messages
        .lines()
        .filter_map(|line| serde_json::from_str::<CargoMessage>(line).ok())
        .filter(|m| m.reason == "compiler-artifact")
        .filter(|m| m.target.as_ref().is_some_and(|t| t.name == PACKAGE_NAME))
        .filter(|m| m.profile.as_ref().is_some_and(|p| p.test == want_test))
        .find_map(|m| m.executable)
}

pub(crate) fn executable_for(messages: &str, mode: Mode) -> Option<PathBuf> {
    find_executable(messages, mode == Mode::Check)
}
