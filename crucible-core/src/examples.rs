//! Example tasks demonstrating the schema.
//!
//! One task per kind of check: expected output, required pattern plus
//! expected output, and a test harness.

use crate::id::{LessonId, TaskId};
use crate::task::Task;

/// Returns the three canonical example tasks.
///
/// # Panics
/// Never panics; all task ids are hard-coded non-empty values.
#[must_use]
pub fn example_tasks() -> Vec<Task> {
    #[expect(clippy::unwrap_used, reason = "literal ids are non-empty")]
    let hello = Task::new(TaskId::new("hello-world").unwrap(), LessonId::new("basics-1"), 10)
        .with_prompt("Print `Hello` to standard output.")
        .with_starter_code("fn main() {\n    // your code here\n}\n")
        .with_expected_output("Hello");

    #[expect(clippy::unwrap_used, reason = "literal ids are non-empty")]
    let answer = Task::new(TaskId::new("the-answer").unwrap(), LessonId::new("functions-1"), 20)
        .with_prompt("Write `fn answer() -> i32` and print its result.")
        .with_starter_code(
            "fn answer() -> i32 {\n    todo!()\n}\n\n\
             fn main() {\n    println!(\"{}\", answer());\n}\n",
        )
        .with_expected_output("42")
        .with_required_pattern("fn answer");

    #[expect(clippy::unwrap_used, reason = "literal ids are non-empty")]
    let add = Task::new(TaskId::new("add-two").unwrap(), LessonId::new("functions-2"), 30)
        .with_prompt("Implement `fn add(a: i32, b: i32) -> i32`.")
        .with_starter_code("fn add(a: i32, b: i32) -> i32 {\n    todo!()\n}\n\nfn main() {}\n")
        .with_tests(
            "use super::*;\n\n\
             #[test]\nfn adds_small_numbers() {\n    assert_eq!(add(2, 3), 5);\n}\n\n\
             #[test]\nfn adds_negatives() {\n    assert_eq!(add(-2, -3), -5);\n}\n",
        );

    vec![hello, answer, add]
}
