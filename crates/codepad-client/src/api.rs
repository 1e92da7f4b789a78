//! Async service traits the orchestration layer is written against.

use async_trait::async_trait;
use codepad_core::{EditorError, ExecutionRequest, ExecutionResult, Project, ProjectId};

/// Backend project store.
#[async_trait]
pub trait ProjectApi: Send + Sync {
    /// Fetches a project. `NotFound` when the backend refuses, `Network` on
    /// transport failure.
    async fn load(&self, token: Option<&str>, id: &ProjectId) -> Result<Project, EditorError>;

    /// Persists `code` for the project. `Validation` when the backend
    /// refuses, `Network` on transport failure.
    async fn save(
        &self,
        token: Option<&str>,
        id: &ProjectId,
        code: &str,
    ) -> Result<(), EditorError>;
}

/// Sandboxed code execution service.
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Runs the request. A nonzero exit code is `Ok` with
    /// `succeeded == false`; only transport and malformed responses are `Err`.
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, EditorError>;
}
