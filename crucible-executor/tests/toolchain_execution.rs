//! Integration tests: real builds and runs through the host cargo toolchain.
//!
//! Every test gets its own workspace root so leftover directories can be
//! detected by listing it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crucible_core::ExecutionStatus;
use crucible_executor::{CodeExecutor, ExecutorConfig, LocalExecutor};
use tempfile::TempDir;
use tokio::time::Instant;

/// Generous ceiling for tests that expect the program to finish.
const SLOW_HOST_TIMEOUT: Duration = Duration::from_secs(300);

fn cargo() -> PathBuf {
    std::env::var_os("CARGO").map_or_else(|| PathBuf::from("cargo"), PathBuf::from)
}

fn setup(run_timeout: Duration) -> (TempDir, LocalExecutor) {
    let root = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => panic!("failed to create workspace root: {e}"),
    };
    let config = ExecutorConfig::default()
        .with_workspace_root(root.path())
        .with_cargo(cargo())
        .with_run_timeout(run_timeout);
    (root, LocalExecutor::new(config))
}

fn entries(root: &Path) -> usize {
    match std::fs::read_dir(root) {
        Ok(dir) => dir.count(),
        Err(e) => panic!("cannot list {}: {e}", root.display()),
    }
}

/// Live processes whose command line or working directory lies under `root`.
fn processes_under(root: &Path) -> Vec<String> {
    let needle = root.to_string_lossy().into_owned();
    let Ok(proc_dir) = std::fs::read_dir("/proc") else {
        return Vec::new();
    };
    proc_dir
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|e| {
            let dir = e.path();
            let stat = std::fs::read_to_string(dir.join("stat")).ok()?;
            let state = stat.rsplit_once(')')?.1.trim_start().chars().next()?;
            if matches!(state, 'Z' | 'X') {
                return None;
            }
            let cmdline = std::fs::read(dir.join("cmdline")).ok()?;
            let cmdline = String::from_utf8_lossy(&cmdline).replace('\0', " ");
            let cwd = std::fs::read_link(dir.join("cwd")).ok();
            let inside = cmdline.contains(&needle) || cwd.is_some_and(|c| c.starts_with(root));
            inside.then(|| format!("{}: {}", e.file_name().to_string_lossy(), cmdline.trim()))
        })
        .collect()
}

/// Wait briefly for SIGKILLed processes to disappear, then report survivors.
async fn survivors(root: &Path) -> Vec<String> {
    for _ in 0..30 {
        if processes_under(root).is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    processes_under(root)
}

/// A `main` that takes rustc several seconds to compile, within the size limit.
fn slow_to_build() -> String {
    let mut code = String::from("fn main() {\n    let mut v = Vec::new();\n");
    for i in 0..2000 {
        code.push_str(&format!("    v.push(format!(\"{{}}\", {i}));\n"));
    }
    code.push_str("    println!(\"{}\", v.len());\n}\n");
    code
}

#[tokio::test]
async fn hello_program_succeeds_with_exact_stdout() {
    let (root, executor) = setup(SLOW_HOST_TIMEOUT);
    let result = executor
        .run("fn main() {\n    println!(\"Hello\");\n}\n", None)
        .await
        .unwrap_or_else(|e| panic!("infrastructure error: {e}"));

    assert!(result.success, "run failed: {}", result.error);
    assert_eq!(result.status, ExecutionStatus::Success);
    assert_eq!(result.stdout, "Hello\n");
    assert_eq!(result.error, "");
    assert_eq!(entries(root.path()), 0, "workspace must be removed");
}

#[tokio::test]
async fn compile_error_is_reported_as_failure() {
    let (root, executor) = setup(SLOW_HOST_TIMEOUT);
    let result = executor
        .run("fn main() {\n    let x: i32 = \"nope\";\n}\n", None)
        .await
        .unwrap_or_else(|e| panic!("infrastructure error: {e}"));

    assert!(!result.success);
    assert_eq!(result.status, ExecutionStatus::Error);
    assert!(!result.error.is_empty(), "compile error must be described");
    assert!(result.error.contains("mismatched types"), "error: {}", result.error);
    assert_eq!(entries(root.path()), 0);
}

#[tokio::test]
async fn runtime_panic_reports_stderr() {
    let (_root, executor) = setup(SLOW_HOST_TIMEOUT);
    let code = "fn main() {\n    println!(\"before\");\n    panic!(\"boom\");\n}\n";
    let result = executor
        .run(code, None)
        .await
        .unwrap_or_else(|e| panic!("infrastructure error: {e}"));

    assert!(!result.success);
    assert_eq!(result.status, ExecutionStatus::Error);
    assert_eq!(result.stdout, "before\n");
    assert!(result.error.contains("boom"), "error: {}", result.error);
}

#[tokio::test]
async fn silent_nonzero_exit_reports_exit_status() {
    let (_root, executor) = setup(SLOW_HOST_TIMEOUT);
    let result = executor
        .run("fn main() {\n    std::process::exit(3);\n}\n", None)
        .await
        .unwrap_or_else(|e| panic!("infrastructure error: {e}"));

    assert!(!result.success);
    assert_eq!(result.error, "exit status 3");
}

#[tokio::test]
async fn sleeping_program_times_out_and_leaves_nothing() {
    let (root, executor) = setup(Duration::from_secs(5));
    let code = "fn main() {\n    std::thread::sleep(std::time::Duration::from_secs(120));\n}\n";
    let start = Instant::now();
    let result = executor
        .run(code, None)
        .await
        .unwrap_or_else(|e| panic!("infrastructure error: {e}"));

    assert!(!result.success);
    assert_eq!(result.status, ExecutionStatus::Timeout);
    assert_eq!(result.error, "execution exceeded 5s");
    assert!(start.elapsed() < Duration::from_secs(60), "child must be killed at the deadline");
    assert_eq!(entries(root.path()), 0, "workspace must be removed after a timeout");
}

#[tokio::test]
async fn build_timeout_leaves_no_toolchain_process() {
    let (root, executor) = setup(SLOW_HOST_TIMEOUT);
    let code = slow_to_build();
    assert!(code.len() < crucible_executor::DEFAULT_MAX_CODE_SIZE);

    for millis in [400, 1500] {
        let deadline = Instant::now() + Duration::from_millis(millis);
        let result = executor
            .run(&code, Some(deadline))
            .await
            .unwrap_or_else(|e| panic!("infrastructure error: {e}"));

        assert_eq!(result.status, ExecutionStatus::Timeout, "deadline {millis}ms");
        let left = survivors(root.path()).await;
        assert!(left.is_empty(), "processes outlived a {millis}ms build timeout: {left:?}");
        assert_eq!(entries(root.path()), 0);
    }
}

#[tokio::test]
async fn background_child_neither_blocks_nor_swallows_output() {
    let (root, executor) = setup(SLOW_HOST_TIMEOUT);
    let code = "use std::process::Command;\n\nfn main() {\n    println!(\"42\");\n    \
                Command::new(\"sleep\").arg(\"37\").spawn().unwrap();\n}\n";
    let start = Instant::now();
    let result = executor
        .run(code, None)
        .await
        .unwrap_or_else(|e| panic!("infrastructure error: {e}"));

    assert!(result.success, "run failed: {}", result.error);
    assert_eq!(result.stdout, "42\n");
    assert!(start.elapsed() < Duration::from_secs(37 + 240), "must not wait out the sleep");
    let left = survivors(root.path()).await;
    assert!(left.is_empty(), "background child outlived the run: {left:?}");
}

#[tokio::test]
async fn dropped_run_kills_program_and_removes_workspace() {
    let (root, executor) = setup(SLOW_HOST_TIMEOUT);
    let code = "fn main() {\n    println!(\"up\");\n    \
                std::thread::sleep(std::time::Duration::from_secs(120));\n}\n";

    let mut run = Box::pin(executor.run(code, None));
    let running = async {
        loop {
            let procs = processes_under(root.path());
            if procs.iter().any(|p| p.contains("target/debug/submission")) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    };
    tokio::select! {
        result = &mut run => panic!("sleeper finished before cancellation: {result:?}"),
        () = tokio::time::sleep(SLOW_HOST_TIMEOUT) => panic!("program never started"),
        () = running => {}
    }
    drop(run);

    assert_eq!(entries(root.path()), 0, "dropping the future must remove the workspace");
    let left = survivors(root.path()).await;
    assert!(left.is_empty(), "processes outlived cancellation: {left:?}");
}

#[tokio::test]
async fn caller_deadline_wins_when_earlier() {
    let (root, executor) = setup(SLOW_HOST_TIMEOUT);
    let code = "fn main() {\n    std::thread::sleep(std::time::Duration::from_secs(120));\n}\n";
    let start = Instant::now();
    let result = executor
        .run(code, Some(start + Duration::from_secs(3)))
        .await
        .unwrap_or_else(|e| panic!("infrastructure error: {e}"));

    assert_eq!(result.status, ExecutionStatus::Timeout);
    assert!(start.elapsed() < Duration::from_secs(60));
    assert_eq!(entries(root.path()), 0);
}

#[tokio::test]
async fn repeated_runs_use_distinct_workspaces() {
    let (root, executor) = setup(SLOW_HOST_TIMEOUT);
    let code =
        "fn main() {\n    println!(\"{}\", std::env::current_dir().unwrap().display());\n}\n";

    let first = executor
        .run(code, None)
        .await
        .unwrap_or_else(|e| panic!("infrastructure error: {e}"));
    assert_eq!(entries(root.path()), 0, "no residue after first run");
    let second = executor
        .run(code, None)
        .await
        .unwrap_or_else(|e| panic!("infrastructure error: {e}"));
    assert_eq!(entries(root.path()), 0, "no residue after second run");

    assert!(first.success && second.success, "{} / {}", first.error, second.error);
    let (a, b) = (first.stdout.trim(), second.stdout.trim());
    assert!(a.starts_with(&*root.path().to_string_lossy()), "ran in {a}");
    assert_ne!(a, b, "identical code must not reuse a workspace path");
    assert!(!Path::new(a).exists());
}

#[tokio::test]
async fn passing_harness_succeeds() {
    let (_root, executor) = setup(SLOW_HOST_TIMEOUT);
    let code = "fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n\nfn main() {}\n";
    let tests = "use super::*;\n\n#[test]\nfn adds() {\n    assert_eq!(add(2, 3), 5);\n}\n";
    let result = executor
        .check(code, tests, None)
        .await
        .unwrap_or_else(|e| panic!("infrastructure error: {e}"));

    assert!(result.success, "check failed: {}", result.error);
    assert!(result.stdout.contains("test result: ok"), "stdout: {}", result.stdout);
}

#[tokio::test]
async fn failing_harness_reports_test_output() {
    let (root, executor) = setup(SLOW_HOST_TIMEOUT);
    let code = "fn add(a: i32, b: i32) -> i32 {\n    a - b\n}\n\nfn main() {}\n";
    let tests = "use super::*;\n\n#[test]\nfn adds() {\n    assert_eq!(add(2, 3), 5);\n}\n";
    let result = executor
        .check(code, tests, None)
        .await
        .unwrap_or_else(|e| panic!("infrastructure error: {e}"));

    assert!(!result.success);
    assert_eq!(result.status, ExecutionStatus::Error);
    assert!(
        result.error.contains("FAILED"),
        "error should carry the test report: {}",
        result.error
    );
    assert_eq!(result.error, result.stdout);
    assert_eq!(entries(root.path()), 0);
}

#[tokio::test]
async fn concurrent_checks_do_not_cross_talk() {
    let (root, executor) = setup(SLOW_HOST_TIMEOUT);
    let executor = Arc::new(executor);

    let handles: Vec<_> = (0..20u32)
        .map(|i| {
            let executor = Arc::clone(&executor);
            tokio::spawn(async move {
                let code = format!("fn value() -> u32 {{\n    {i}\n}}\n\nfn main() {{}}\n");
                let tests = format!(
                    "use super::*;\n\n#[test]\nfn task_{i:02}() {{\n    \
                     eprintln!(\"marker-{i:02}\");\n    assert_eq!(value(), {i});\n}}\n"
                );
                let result = executor.check(&code, &tests, None).await;
                (i, result)
            })
        })
        .collect();

    for handle in handles {
        let (i, result) = match handle.await {
            Ok(r) => r,
            Err(e) => panic!("task panicked: {e}"),
        };
        let result = result.unwrap_or_else(|e| panic!("infrastructure error in {i}: {e}"));
        assert!(result.success, "check {i} failed: {}", result.error);
        let own = format!("task_{i:02}");
        assert!(
            result.stdout.contains(&own),
            "check {i} stdout lacks its own test: {}",
            result.stdout
        );
        for j in (0..20u32).filter(|j| *j != i) {
            let other = format!("task_{j:02}");
            assert!(!result.stdout.contains(&other), "check {i} saw output of {j}");
            let marker = format!("marker-{j:02}");
            assert!(!result.stderr.contains(&marker), "check {i} saw stderr of {j}");
        }
    }
    assert_eq!(entries(root.path()), 0);
}

#[tokio::test]
async fn oversized_code_touches_nothing() {
    let root = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => panic!("{e}"),
    };
    let ws_root = root.path().join("never-created");
    let executor = LocalExecutor::new(
        ExecutorConfig::default().with_workspace_root(&ws_root).with_cargo(cargo()),
    );
    let padding = "x".repeat(crucible_executor::DEFAULT_MAX_CODE_SIZE);
    let code = format!("fn main() {{}}\n// {padding}\n");

    let result = executor
        .run(&code, None)
        .await
        .unwrap_or_else(|e| panic!("infrastructure error: {e}"));
    assert!(!result.success);
    assert!(result.error.starts_with("code too large: "), "error: {}", result.error);
    assert!(result.error.ends_with("(max 102400)"));
    assert!(!ws_root.exists());
}
