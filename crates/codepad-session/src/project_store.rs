//! Project load/save with per-project save-state tracking.

use std::sync::{Arc, PoisonError, RwLock};

use codepad_client::ProjectApi;
use codepad_core::{EditableBuffer, EditorError, Project, ProjectId};
use dashmap::DashMap;

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Idle,
    Saving,
}

/// Loads a project into the editable buffer and writes buffer text back.
///
/// The store keeps its own copy of the last persisted project so it can tell
/// whether the buffer has unsaved edits. Saves never modify the buffer.
pub struct ProjectStore {
    api: Arc<dyn ProjectApi>,
    settings: Arc<Settings>,
    buffer: Arc<EditableBuffer>,
    persisted: RwLock<Option<Project>>,
    /// Saves currently awaiting the backend, per project.
    in_flight: DashMap<ProjectId, usize>,
}

/// Counts one in-flight save for as long as it lives.
struct InFlightSave<'a> {
    in_flight: &'a DashMap<ProjectId, usize>,
    id: ProjectId,
}

impl Drop for InFlightSave<'_> {
    fn drop(&mut self) {
        if let Some(mut count) = self.in_flight.get_mut(&self.id) {
            *count = count.saturating_sub(1);
        }
        self.in_flight.remove_if(&self.id, |_, count| *count == 0);
    }
}

impl ProjectStore {
    pub fn new(
        api: Arc<dyn ProjectApi>,
        settings: Arc<Settings>,
        buffer: Arc<EditableBuffer>,
    ) -> Self {
        ProjectStore {
            api,
            settings,
            buffer,
            persisted: RwLock::new(None),
            in_flight: DashMap::new(),
        }
    }

    pub fn buffer(&self) -> &Arc<EditableBuffer> {
        &self.buffer
    }

    /// Last loaded or saved copy of the project.
    pub fn project(&self) -> Option<Project> {
        self.persisted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetches the project and replaces the buffer with its code.
    ///
    /// On failure the buffer is left untouched.
    pub async fn load(&self, id: &ProjectId) -> Result<Project, EditorError> {
        let token = self.settings.token();
        let project = self.api.load(token.as_deref(), id).await?;

        self.buffer.load(project.code.clone());
        *self.persisted.write().unwrap_or_else(PoisonError::into_inner) = Some(project.clone());
        tracing::info!(project = %id, language = %project.language, "project loaded");
        Ok(project)
    }

    /// Persists `text` (trimmed) for the project.
    ///
    /// Always issues the request, even while another save for the same
    /// project is in flight; racing saves resolve last-write-wins at the
    /// backend. Use [`save_if_idle`](Self::save_if_idle) to gate.
    pub async fn save(&self, id: &ProjectId, text: &str) -> Result<(), EditorError> {
        let guard = self.enter(id, false);
        self.send_save(id, text, guard).await
    }

    /// Like [`save`](Self::save) but returns `None` without issuing a
    /// request when a save for the project is already in flight. The check
    /// and the state change are atomic.
    pub async fn save_if_idle(
        &self,
        id: &ProjectId,
        text: &str,
    ) -> Option<Result<(), EditorError>> {
        let guard = self.enter(id, true)?;
        Some(self.send_save(id, text, Some(guard)).await)
    }

    pub fn save_state(&self, id: &ProjectId) -> SaveState {
        match self.in_flight.get(id) {
            Some(count) if *count > 0 => SaveState::Saving,
            _ => SaveState::Idle,
        }
    }

    /// Whether saving the buffer would change the persisted code.
    ///
    /// Saves send trimmed text, so surrounding whitespace never counts as an
    /// edit.
    pub fn is_dirty(&self) -> bool {
        let text = self.buffer.text();
        let persisted = self.persisted.read().unwrap_or_else(PoisonError::into_inner);
        match persisted.as_ref() {
            Some(project) => project.code.trim() != text.trim(),
            None => !text.trim().is_empty(),
        }
    }

    fn enter(&self, id: &ProjectId, only_if_idle: bool) -> Option<InFlightSave<'_>> {
        let mut count = self.in_flight.entry(id.clone()).or_insert(0);
        if only_if_idle && *count > 0 {
            tracing::debug!(project = %id, "save skipped: one is already in flight");
            return None;
        }
        *count += 1;
        Some(InFlightSave {
            in_flight: &self.in_flight,
            id: id.clone(),
        })
    }

    async fn send_save(
        &self,
        id: &ProjectId,
        text: &str,
        guard: Option<InFlightSave<'_>>,
    ) -> Result<(), EditorError> {
        let code = text.trim();
        let token = self.settings.token();
        let result = self.api.save(token.as_deref(), id, code).await;
        drop(guard);

        match &result {
            Ok(()) => {
                let mut persisted = self.persisted.write().unwrap_or_else(PoisonError::into_inner);
                if let Some(project) = persisted.as_mut().filter(|p| &p.id == id) {
                    project.code = code.to_string();
                }
                tracing::info!(project = %id, bytes = code.len(), "project saved");
            }
            Err(err) => {
                tracing::warn!(project = %id, error = %err, "project save failed");
            }
        }
        result
    }
}
