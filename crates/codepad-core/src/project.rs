//! Persisted projects and the live editable buffer mirrored from them.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::id::ProjectId;

/// A persisted code artifact as returned by the project backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// Display name shown in the editor header.
    pub name: String,
    pub code: String,
    /// Execution-service language id, e.g. `python`.
    pub language: String,
    pub version: String,
}

impl Project {
    /// Filename sent with full-project runs: `main.<language>`.
    pub fn main_filename(&self) -> String {
        format!("main.{}", self.language)
    }
}

#[derive(Debug, Default)]
struct BufferState {
    text: String,
    revision: u64,
}

/// Current, possibly-unsaved code text bound to the editing widget.
///
/// Mutated only through [`apply_change`](Self::apply_change) (widget
/// notifications) and [`load`](Self::load) (explicit project load). Every
/// mutation bumps the revision so observers can tell edits apart from
/// identical text.
#[derive(Debug, Default)]
pub struct EditableBuffer {
    state: RwLock<BufferState>,
}

impl EditableBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        EditableBuffer {
            state: RwLock::new(BufferState {
                text: text.into(),
                revision: 0,
            }),
        }
    }

    /// Snapshot of the current text.
    pub fn text(&self) -> String {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .text
            .clone()
    }

    pub fn revision(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .revision
    }

    /// Applies a content-changed notification from the editing widget.
    pub fn apply_change(&self, text: impl Into<String>) -> u64 {
        self.replace(text.into())
    }

    /// Replaces the buffer with freshly loaded project code.
    pub fn load(&self, text: impl Into<String>) -> u64 {
        self.replace(text.into())
    }

    fn replace(&self, text: String) -> u64 {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.text = text;
        state.revision += 1;
        state.revision
    }
}
