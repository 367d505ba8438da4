/// Errors produced by the `crucible-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A task identifier was empty or otherwise unusable.
    #[error("invalid task id: {reason}")]
    InvalidTaskId { reason: String },

    /// A task definition field failed validation.
    #[error("task validation failed for field '{field}': {reason}")]
    TaskValidation { field: String, reason: String },
}
