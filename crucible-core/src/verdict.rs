use std::fmt;

use serde::{Deserialize, Serialize};

use crate::execution::RunResult;

/// Longest slice of actual output quoted in a mismatch message.
const MAX_QUOTED_OUTPUT: usize = 200;

/// The check that caused a verdict to fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum CheckFailure {
    /// The submission did not build, crashed, exited non-zero or timed out.
    Execution { error: String },
    /// The program ran but printed something other than the expected output.
    OutputMismatch { expected: String, actual: String },
    /// The submitted code does not contain a required pattern.
    MissingPattern { pattern: String },
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Execution { error } => f.write_str(error),
            Self::OutputMismatch { expected, actual } => write!(
                f,
                "output mismatch: expected {:?}, got {:?}",
                expected,
                quote(actual)
            ),
            Self::MissingPattern { pattern } => {
                write!(f, "code must contain {pattern:?}")
            }
        }
    }
}

fn quote(s: &str) -> String {
    if s.chars().count() <= MAX_QUOTED_OUTPUT {
        return s.to_owned();
    }
    let mut out: String = s.chars().take(MAX_QUOTED_OUTPUT).collect();
    out.push('…');
    out
}

/// The verifier's pass/fail decision for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Verdict {
    /// Whether every check passed.
    pub pass: bool,
    /// Diagnostic text; names the failed expectation on a fail.
    pub detail: String,
    /// The failed check, if any.
    pub failure: Option<CheckFailure>,
    /// The execution this verdict was derived from.
    pub run: RunResult,
}

impl Verdict {
    /// A passing verdict.
    #[must_use]
    pub fn passed(run: RunResult) -> Self {
        Self { pass: true, detail: "all checks passed".to_owned(), failure: None, run }
    }

    /// A failing verdict caused by `failure`.
    #[must_use]
    pub fn failed(run: RunResult, failure: CheckFailure) -> Self {
        Self { pass: false, detail: failure.to_string(), failure: Some(failure), run }
    }
}
