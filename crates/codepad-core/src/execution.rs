//! Execution requests, normalized results, and the run lifecycle marker.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unit of work sent to the execution service. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub language: String,
    pub version: String,
    /// Full-project runs name the file `main.<language>`; selection runs
    /// leave it unset.
    pub filename: Option<String>,
    pub content: String,
}

impl ExecutionRequest {
    pub fn new(
        language: impl Into<String>,
        version: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        ExecutionRequest {
            language: language.into(),
            version: version.into(),
            filename: None,
            content: content.into(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Normalized execution-service response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub exit_code: i64,
    /// Combined stdout/stderr text as reported by the service.
    pub raw_output: String,
    pub succeeded: bool,
}

impl ExecutionResult {
    /// Builds a result whose success flag is derived solely from the exit code.
    pub fn from_exit(exit_code: i64, raw_output: impl Into<String>) -> Self {
        ExecutionResult {
            exit_code,
            raw_output: raw_output.into(),
            succeeded: exit_code == 0,
        }
    }
}

/// Lifecycle marker of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionPhase {
    #[default]
    Idle,
    Compiling,
    Running,
    Completed,
    Failed,
}

impl ExecutionPhase {
    /// Phases during which a run is in flight and new runs are refused.
    pub fn is_active(self) -> bool {
        matches!(self, ExecutionPhase::Compiling | ExecutionPhase::Running)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionPhase::Completed | ExecutionPhase::Failed)
    }

    /// Progress-bar label shown for the phase.
    pub fn status_label(self) -> &'static str {
        match self {
            ExecutionPhase::Idle => "",
            ExecutionPhase::Compiling => "Compiling code...",
            ExecutionPhase::Running => "Executing program...",
            ExecutionPhase::Completed => "Completed successfully",
            ExecutionPhase::Failed => "Execution failed",
        }
    }
}

impl fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionPhase::Idle => "idle",
            ExecutionPhase::Compiling => "compiling",
            ExecutionPhase::Running => "running",
            ExecutionPhase::Completed => "completed",
            ExecutionPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_follows_exit_code_only() {
        assert!(ExecutionResult::from_exit(0, "").succeeded);
        assert!(!ExecutionResult::from_exit(1, "").succeeded);
        assert!(!ExecutionResult::from_exit(137, "killed").succeeded);
        assert!(!ExecutionResult::from_exit(-1, "").succeeded);
    }

    #[test]
    fn only_compiling_and_running_are_active() {
        assert!(ExecutionPhase::Compiling.is_active());
        assert!(ExecutionPhase::Running.is_active());
        assert!(!ExecutionPhase::Idle.is_active());
        assert!(!ExecutionPhase::Completed.is_active());
        assert!(!ExecutionPhase::Failed.is_active());
    }

    #[test]
    fn phase_serializes_lowercase() {
        let json = serde_json::to_string(&ExecutionPhase::Compiling).unwrap();
        assert_eq!(json, "\"compiling\"");
        assert_eq!(ExecutionPhase::Failed.to_string(), "failed");
    }

    #[test]
    fn with_filename_sets_name() {
        let req =
            ExecutionRequest::new("python", "3.10.0", "print(1)").with_filename("main.python");
        assert_eq!(req.filename.as_deref(), Some("main.python"));
    }
}
