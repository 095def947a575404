//! Error types raised by the pivot core.
//!
//! The core ([`pivot`](crate::pivot) and [`table`](crate::table)) reports failures
//! through the typed [`PivotError`]. Collaborators (sources, sinks, the pipeline)
//! work in `anyhow::Result` and pick these up through `?`.

use thiserror::Error;

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, PivotError>;

/// Failures of the pivot core.
///
/// Neither variant is recoverable locally: the transform is deterministic, so a
/// repeat run over the same input fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PivotError {
    /// A record or row disagrees with the established column schema.
    #[error("schema mismatch for user '{user_id}': {detail}")]
    SchemaMismatch { user_id: String, detail: String },

    /// A (user, path) pair occurred more than once under [`DuplicatePolicy::Reject`].
    ///
    /// [`DuplicatePolicy::Reject`]: crate::pivot::DuplicatePolicy::Reject
    #[error("duplicate path '{path}' for user '{user_id}' (lengths {first} and {second})")]
    DuplicatePath {
        user_id: String,
        path: String,
        first: i64,
        second: i64,
    },
}

impl PivotError {
    pub(crate) fn unknown_path(user_id: &str, path: &str) -> Self {
        Self::SchemaMismatch {
            user_id: user_id.to_string(),
            detail: format!("path '{path}' is not in the catalog"),
        }
    }
}
