//! Backend project API bodies.

use codepad_core::{EditorError, Project, ProjectId};
use serde::{Deserialize, Serialize};

/// `POST /getProject` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadProjectRequest {
    /// Session token; sent as `null` when no one is logged in.
    pub token: Option<String>,
    pub project_id: ProjectId,
}

/// Project record as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub name: String,
    pub code: String,
    pub proj_language: String,
    pub version: String,
}

/// `POST /getProject` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadProjectResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl LoadProjectResponse {
    /// Converts the response into a [`Project`].
    ///
    /// `success: false` maps to [`EditorError::NotFound`] carrying the
    /// backend's message. A successful response without a project body is
    /// malformed and maps to [`EditorError::Network`].
    pub fn into_project(self, id: ProjectId) -> Result<Project, EditorError> {
        if !self.success {
            return Err(EditorError::NotFound(
                self.msg
                    .unwrap_or_else(|| format!("project {} could not be loaded", id)),
            ));
        }
        let payload = self.project.ok_or_else(|| {
            EditorError::Network("load response missing project body".to_string())
        })?;
        Ok(Project {
            id,
            name: payload.name,
            code: payload.code,
            language: payload.proj_language,
            version: payload.version,
        })
    }
}

/// `POST /saveProject` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProjectRequest {
    pub token: Option<String>,
    pub project_id: ProjectId,
    pub code: String,
}

/// `POST /saveProject` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveProjectResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl SaveProjectResponse {
    /// `success: false` maps to [`EditorError::Validation`].
    pub fn into_result(self) -> Result<(), EditorError> {
        if self.success {
            Ok(())
        } else {
            Err(EditorError::Validation(
                self.msg.unwrap_or_else(|| "Failed to save code".to_string()),
            ))
        }
    }
}
