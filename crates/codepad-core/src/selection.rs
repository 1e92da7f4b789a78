//! Tracks the editing widget's selection and picks what a selection run sends.

use std::sync::{Mutex, PoisonError};

use crate::execution::ExecutionRequest;

/// Snippet run when nothing is selected.
pub const DEFAULT_SNIPPET: &str = "print('Hello World')";
/// Language used before any project metadata has loaded.
pub const DEFAULT_LANGUAGE: &str = "python";
/// Version paired with [`DEFAULT_LANGUAGE`].
pub const DEFAULT_VERSION: &str = "3.9.0";

/// Latest non-empty selection reported by the editing widget.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    current: Mutex<Option<String>>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a selection-changed notification. An empty selection clears
    /// the tracker.
    pub fn update(&self, selection: &str) {
        let next = if selection.is_empty() {
            None
        } else {
            Some(selection.to_string())
        };
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    pub fn clear(&self) {
        self.update("");
    }

    pub fn current_selection(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Builds the request for a selection run.
///
/// A present selection becomes the content; otherwise [`DEFAULT_SNIPPET`] is
/// used. Language and version fall back to [`DEFAULT_LANGUAGE`] and
/// [`DEFAULT_VERSION`] independently when absent. No filename is attached.
pub fn resolve_run_target(
    selection: Option<&str>,
    language: Option<&str>,
    version: Option<&str>,
) -> ExecutionRequest {
    let content = selection
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SNIPPET);
    ExecutionRequest::new(
        language.unwrap_or(DEFAULT_LANGUAGE),
        version.unwrap_or(DEFAULT_VERSION),
        content,
    )
}
