//! Error taxonomy shared by every codepad crate.
//!
//! Uses `thiserror` for structured, matchable variants. A nonzero exit code
//! from the execution service is deliberately absent here: it is a normal
//! [`ExecutionResult`](crate::ExecutionResult) outcome, not an error.

use thiserror::Error;

/// Errors surfaced by remote project and execution operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// Transport failure or an unreadable/malformed response body.
    #[error("network error: {0}")]
    Network(String),

    /// Well-formed response that reported `success: false`.
    #[error("service error: {0}")]
    Service(String),

    /// The backend rejected a save.
    #[error("validation error: {0}")]
    Validation(String),

    /// The backend rejected a project load.
    #[error("not found: {0}")]
    NotFound(String),
}

impl EditorError {
    /// The message carried by the variant, without the category prefix.
    ///
    /// This is the text shown in user-facing notifications.
    pub fn message(&self) -> &str {
        match self {
            EditorError::Network(msg)
            | EditorError::Service(msg)
            | EditorError::Validation(msg)
            | EditorError::NotFound(msg) => msg,
        }
    }

    /// Returns `true` for transport-level failures.
    pub fn is_network(&self) -> bool {
        matches!(self, EditorError::Network(_))
    }
}
