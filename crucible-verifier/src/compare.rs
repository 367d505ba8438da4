//! Secondary checks: expected output and required code patterns.

use serde::{Deserialize, Serialize};

/// How captured stdout is compared with a task's expected output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum OutputMatch {
    /// Byte-for-byte equality.
    Exact,
    /// Equality after [`normalize`]: line endings unified, trailing
    /// whitespace and trailing blank lines ignored.
    #[default]
    Normalized,
}

impl OutputMatch {
    /// Whether `actual` satisfies `expected` under this policy.
    #[must_use]
    pub fn matches(self, expected: &str, actual: &str) -> bool {
        match self {
            Self::Exact => expected == actual,
            Self::Normalized => normalize(expected) == normalize(actual),
        }
    }
}

/// Canonical form of program output for comparison.
///
/// CRLF becomes LF, each line loses its trailing whitespace, and trailing
/// blank lines are dropped. Leading whitespace is significant.
#[must_use]
pub fn normalize(output: &str) -> String {
    let joined = output.lines().map(str::trim_end).collect::<Vec<_>>().join("\n");
    joined.trim_end().to_owned()
}

/// The first pattern in `patterns` that does not occur in `code`.
#[must_use]
pub fn first_missing_pattern<'a>(code: &str, patterns: &'a [String]) -> Option<&'a str> {
    patterns.iter().map(String::as_str).find(|p| !code.contains(p))
}
