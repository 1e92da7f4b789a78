//! reqwest client for the backend project API.

use async_trait::async_trait;
use codepad_core::{EditorError, Project, ProjectId};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::ProjectApi;
use crate::schema::project::{
    LoadProjectRequest, LoadProjectResponse, SaveProjectRequest, SaveProjectResponse,
};

/// Talks to `{base_url}/getProject` and `{base_url}/saveProject`.
#[derive(Debug, Clone)]
pub struct HttpProjectApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpProjectApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpProjectApi {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Posts `body` and decodes the JSON reply.
    ///
    /// The backend reports refusals in the body (`success: false`), often
    /// alongside a 4xx status, so the body is decoded whatever the status.
    /// Only an unreadable body is a transport error.
    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, EditorError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|err| EditorError::Network(format!("{} request failed: {}", path, err)))?;

        let status = response.status();
        let body_text = response.text().await.map_err(|err| {
            EditorError::Network(format!("{} response read failed: {}", path, err))
        })?;

        serde_json::from_str(&body_text).map_err(|err| {
            EditorError::Network(format!(
                "{} response parse failed ({}): {}",
                path, status, err
            ))
        })
    }
}

#[async_trait]
impl ProjectApi for HttpProjectApi {
    async fn load(&self, token: Option<&str>, id: &ProjectId) -> Result<Project, EditorError> {
        let body = LoadProjectRequest {
            token: token.map(str::to_string),
            project_id: id.clone(),
        };
        let response: LoadProjectResponse = self.post("getProject", &body).await?;
        response.into_project(id.clone())
    }

    async fn save(
        &self,
        token: Option<&str>,
        id: &ProjectId,
        code: &str,
    ) -> Result<(), EditorError> {
        let body = SaveProjectRequest {
            token: token.map(str::to_string),
            project_id: id.clone(),
            code: code.to_string(),
        };
        let response: SaveProjectResponse = self.post("saveProject", &body).await?;
        response.into_result()
    }
}
