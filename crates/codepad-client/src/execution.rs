//! reqwest client for the piston-compatible execution service.

use async_trait::async_trait;
use codepad_core::{EditorError, ExecutionRequest, ExecutionResult};

use crate::api::ExecutionService;
use crate::schema::execute::{ExecuteRequest, ExecuteResponse};

/// Public piston endpoint used when no override is configured.
pub const DEFAULT_EXECUTE_URL: &str = "https://emkc.org/api/v2/piston/execute";

/// Posts run requests to the execution service.
///
/// The underlying client has no request timeout: a service that never
/// answers keeps the run pending until it does.
#[derive(Debug, Clone)]
pub struct ExecutionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ExecutionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        ExecutionClient {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for ExecutionClient {
    fn default() -> Self {
        Self::new(DEFAULT_EXECUTE_URL)
    }
}

#[async_trait]
impl ExecutionService for ExecutionClient {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, EditorError> {
        let body = ExecuteRequest::from(request);
        tracing::debug!(
            language = %request.language,
            version = %request.version,
            bytes = request.content.len(),
            "posting execution request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| EditorError::Network(format!("execution request failed: {}", err)))?;

        let status = response.status();
        let body_text = response.text().await.map_err(|err| {
            EditorError::Network(format!("execution response read failed: {}", err))
        })?;

        let parsed: ExecuteResponse = serde_json::from_str(&body_text).map_err(|err| {
            EditorError::Network(format!(
                "execution response parse failed ({}): {}",
                status, err
            ))
        })?;

        let result = parsed.into_result()?;
        tracing::debug!(exit_code = result.exit_code, "execution finished");
        Ok(result)
    }
}
