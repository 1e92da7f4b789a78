//! Execution service bodies (piston-compatible).

use codepad_core::{EditorError, ExecutionRequest, ExecutionResult};
use serde::{Deserialize, Serialize};

/// One source file in an execute request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub content: String,
}

/// `POST /execute` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub language: String,
    pub version: String,
    pub files: Vec<ExecuteFile>,
}

impl From<&ExecutionRequest> for ExecuteRequest {
    fn from(req: &ExecutionRequest) -> Self {
        ExecuteRequest {
            language: req.language.clone(),
            version: req.version.clone(),
            files: vec![ExecuteFile {
                filename: req.filename.clone(),
                content: req.content.clone(),
            }],
        }
    }
}

/// Run stage of an execute response. Every field is optional on the wire so
/// that a missing one is reported as malformed rather than as a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunPayload {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
}

/// `POST /execute` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default)]
    pub run: Option<RunPayload>,
    /// Error text the service sends instead of `run` when it refuses a request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExecuteResponse {
    /// Normalizes the response into an [`ExecutionResult`].
    ///
    /// A refusal (`message` instead of `run`) is [`EditorError::Service`].
    /// Any other missing `run`, `run.code` or `run.output` is malformed and
    /// maps to [`EditorError::Network`]. A nonzero code is a normal,
    /// unsuccessful result.
    pub fn into_result(self) -> Result<ExecutionResult, EditorError> {
        let Some(run) = self.run else {
            return Err(match self.message {
                Some(message) => EditorError::Service(message),
                None => EditorError::Network(
                    "malformed execution response: missing run result".to_string(),
                ),
            });
        };
        let code = run.code.ok_or_else(|| {
            EditorError::Network("malformed execution response: missing run.code".to_string())
        })?;
        let output = run.output.ok_or_else(|| {
            EditorError::Network("malformed execution response: missing run.output".to_string())
        })?;
        Ok(ExecutionResult::from_exit(code, output))
    }
}
