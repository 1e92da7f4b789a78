//! The facade the editing view calls into.
//!
//! Every affordance (toolbar buttons, mobile nav, keyboard shortcuts) goes
//! through one [`EditorController`] method, and every run goes through the
//! one [`ExecutionStateMachine`]. Errors stop here: they are logged, turned
//! into notifications and never leave the editable buffer half-updated.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use codepad_client::{ExecutionClient, ExecutionService, HttpProjectApi, ProjectApi};
use codepad_core::selection::{DEFAULT_LANGUAGE, DEFAULT_VERSION};
use codepad_core::{
    resolve_run_target, CompactPanel, EditableBuffer, EditorError, ExecutionRequest, LayoutMode,
    Project, ProjectId, SelectionTracker, Theme, ViewModeController, ViewPreferences,
};
use tokio::sync::{mpsc, watch};

use crate::config::ClientConfig;
use crate::notify::{Notification, Notifier};
use crate::project_store::{ProjectStore, SaveState};
use crate::settings::{Settings, SettingsError};
use crate::shortcuts::{ActionTarget, KeyDisposition, KeyEvent, ShortcutAction, ShortcutDispatcher};
use crate::state_machine::{ExecutionStateMachine, RunSnapshot, RunTiming, StartOutcome};
use crate::timer::{Timer, TokioTimer};

/// Width assumed until the host reports a real viewport.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// Collaborators injected into [`EditorController::new`].
pub struct ControllerParts {
    pub settings: Arc<Settings>,
    pub project_api: Arc<dyn ProjectApi>,
    pub executor: Arc<dyn ExecutionService>,
    pub timer: Arc<dyn Timer>,
    pub timing: RunTiming,
    pub viewport_width: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// A save for this project was still in flight; nothing was sent.
    AlreadySaving,
    NoProject,
    Failed(EditorError),
}

struct ControllerInner {
    settings: Arc<Settings>,
    store: ProjectStore,
    selection: SelectionTracker,
    machine: ExecutionStateMachine,
    shortcuts: ShortcutDispatcher,
    view: Mutex<ViewModeController>,
    prefs: Mutex<ViewPreferences>,
    project_id: RwLock<Option<ProjectId>>,
    notifier: Notifier,
}

impl ActionTarget for ControllerInner {
    fn perform(self: Arc<Self>, action: ShortcutAction) {
        EditorController { inner: self }.perform(action);
    }
}

/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct EditorController {
    inner: Arc<ControllerInner>,
}

impl EditorController {
    /// Builds the controller and registers its keyboard shortcuts.
    ///
    /// The returned receiver yields the notifications the view should show.
    pub fn new(parts: ControllerParts) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (notifier, notifications) = Notifier::channel();
        let buffer = Arc::new(EditableBuffer::default());
        let inner = Arc::new(ControllerInner {
            settings: Arc::clone(&parts.settings),
            store: ProjectStore::new(parts.project_api, parts.settings, buffer),
            selection: SelectionTracker::new(),
            machine: ExecutionStateMachine::new(parts.executor, parts.timer, parts.timing),
            shortcuts: ShortcutDispatcher::with_default_bindings(),
            view: Mutex::new(ViewModeController::new(parts.viewport_width)),
            prefs: Mutex::new(ViewPreferences::default()),
            project_id: RwLock::new(None),
            notifier,
        });

        let target: Arc<dyn ActionTarget> = inner.clone();
        inner.shortcuts.register(Arc::downgrade(&target));

        (EditorController { inner }, notifications)
    }

    /// Wires the HTTP clients, the settings file and the tokio clock from
    /// `config`.
    pub fn from_config(
        config: &ClientConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Notification>), SettingsError> {
        let settings = Arc::new(Settings::open(&config.settings_path)?);
        Ok(Self::new(ControllerParts {
            settings,
            project_api: Arc::new(HttpProjectApi::new(config.api_base_url.clone())),
            executor: Arc::new(ExecutionClient::new(config.execute_url.clone())),
            timer: Arc::new(TokioTimer),
            timing: config.timing,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
        }))
    }

    // -------------------------------------------------------------------
    // Project
    // -------------------------------------------------------------------

    /// Opens the view on a project and loads it into the buffer.
    ///
    /// The project id is remembered even when loading fails, so a later save
    /// still targets it.
    pub async fn open(&self, id: ProjectId) -> Option<Project> {
        *self
            .inner
            .project_id
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(id.clone());

        match self.inner.store.load(&id).await {
            Ok(project) => Some(project),
            Err(err) => {
                tracing::warn!(project = %id, error = %err, "project load failed");
                let message = match &err {
                    EditorError::Network(_) => "Failed to load project.".to_string(),
                    other => other.message().to_string(),
                };
                self.inner.notifier.error(message);
                None
            }
        }
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.inner
            .project_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn project(&self) -> Option<Project> {
        self.inner.store.project()
    }

    /// Saves the buffer unless a save for the project is already in flight.
    pub async fn save(&self) -> SaveOutcome {
        let Some(id) = self.project_id() else {
            self.inner.notifier.error("No project is open.");
            return SaveOutcome::NoProject;
        };
        let text = self.inner.store.buffer().text();

        match self.inner.store.save_if_idle(&id, &text).await {
            None => SaveOutcome::AlreadySaving,
            Some(Ok(())) => {
                self.inner.notifier.success("Project saved successfully!");
                SaveOutcome::Saved
            }
            Some(Err(err)) => {
                let message = match &err {
                    EditorError::Network(_) => "Failed to save code".to_string(),
                    other => other.message().to_string(),
                };
                self.inner.notifier.error(message);
                SaveOutcome::Failed(err)
            }
        }
    }

    pub fn save_state(&self) -> SaveState {
        match self.project_id() {
            Some(id) => self.inner.store.save_state(&id),
            None => SaveState::Idle,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.store.is_dirty()
    }

    // -------------------------------------------------------------------
    // Editing widget notifications
    // -------------------------------------------------------------------

    pub fn on_content_changed(&self, text: impl Into<String>) {
        self.inner.store.buffer().apply_change(text);
    }

    pub fn on_selection_changed(&self, selection: &str) {
        self.inner.selection.update(selection);
    }

    pub fn text(&self) -> String {
        self.inner.store.buffer().text()
    }

    pub fn selection(&self) -> Option<String> {
        self.inner.selection.current_selection()
    }

    // -------------------------------------------------------------------
    // Runs
    // -------------------------------------------------------------------

    /// Runs the whole buffer as `main.<language>`.
    pub async fn run_all(&self) -> StartOutcome {
        let request = self.full_run_request();
        self.run(request).await
    }

    /// Runs the current selection, or the default snippet when nothing is
    /// selected.
    pub async fn run_selection(&self) -> StartOutcome {
        let project = self.inner.store.project();
        let selection = self.inner.selection.current_selection();
        let request = resolve_run_target(
            selection.as_deref(),
            project.as_ref().map(|p| p.language.as_str()),
            project.as_ref().map(|p| p.version.as_str()),
        );
        self.run(request).await
    }

    pub fn run_state(&self) -> watch::Receiver<RunSnapshot> {
        self.inner.machine.subscribe()
    }

    pub fn run_snapshot(&self) -> RunSnapshot {
        self.inner.machine.snapshot()
    }

    fn full_run_request(&self) -> ExecutionRequest {
        let text = self.inner.store.buffer().text();
        match self.inner.store.project() {
            Some(project) => ExecutionRequest::new(&project.language, &project.version, text)
                .with_filename(project.main_filename()),
            None => ExecutionRequest::new(DEFAULT_LANGUAGE, DEFAULT_VERSION, text)
                .with_filename(format!("main.{}", DEFAULT_LANGUAGE)),
        }
    }

    async fn run(&self, request: ExecutionRequest) -> StartOutcome {
        let outcome = self.inner.machine.start(request).await;
        if let Some(finished) = outcome.finished() {
            match (&finished.result, &finished.error) {
                (Some(result), _) if result.succeeded => {
                    self.inner.notifier.success("Code executed successfully!");
                }
                (Some(_), _) => self.inner.notifier.error("Execution failed!"),
                (None, Some(err)) => self
                    .inner
                    .notifier
                    .error(format!("Execution failed: {}", err.message())),
                (None, None) => self.inner.notifier.error("Execution failed: Unknown error"),
            }
        }
        outcome
    }

    // -------------------------------------------------------------------
    // Layout and preferences
    // -------------------------------------------------------------------

    pub fn resize(&self, width: u32) -> LayoutMode {
        self.view().resize(width)
    }

    pub fn layout(&self) -> LayoutMode {
        self.view().mode()
    }

    pub fn toggle_panel(&self) -> LayoutMode {
        self.view().toggle_panel()
    }

    pub fn show_panel(&self, panel: CompactPanel) -> LayoutMode {
        self.view().show_panel(panel)
    }

    pub fn preferences(&self) -> ViewPreferences {
        *self.prefs()
    }

    pub fn toggle_fullscreen(&self) -> bool {
        self.prefs().toggle_fullscreen()
    }

    pub fn increase_font(&self) -> u16 {
        self.prefs().increase_font()
    }

    pub fn decrease_font(&self) -> u16 {
        self.prefs().decrease_font()
    }

    pub fn toggle_output_wrap(&self) -> bool {
        self.prefs().toggle_wrap()
    }

    /// Editor font size for the current layout.
    pub fn editor_font_size(&self) -> u16 {
        let mode = self.layout();
        self.prefs().effective_font_size(mode)
    }

    pub fn theme(&self) -> Theme {
        self.inner.settings.theme()
    }

    /// Flips and persists the theme. A failed write is reported and the
    /// stored theme is returned unchanged.
    pub fn toggle_theme(&self) -> Theme {
        match self.inner.settings.toggle_theme() {
            Ok(theme) => theme,
            Err(err) => {
                tracing::warn!(error = %err, "theme toggle not persisted");
                self.inner.notifier.error("Failed to save theme preference");
                self.inner.settings.theme()
            }
        }
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.inner.settings
    }

    // -------------------------------------------------------------------
    // Keyboard and teardown
    // -------------------------------------------------------------------

    /// Routes a keydown through the shortcut table.
    ///
    /// Save and run are spawned onto the current tokio runtime. Called
    /// outside a runtime they are logged and dropped.
    pub fn handle_key(&self, event: &KeyEvent) -> KeyDisposition {
        self.inner.shortcuts.dispatch(event)
    }

    /// Tears the view down: shortcuts stop dispatching and the pending
    /// run-state reset is cancelled. In-flight network calls are not.
    pub fn close(&self) {
        self.inner.shortcuts.unregister();
        self.inner.machine.teardown();
        tracing::info!(project = ?self.project_id(), "editor view closed");
    }

    fn perform(&self, action: ShortcutAction) {
        match action {
            ShortcutAction::Save => {
                let this = self.clone();
                self.spawn_action(action, async move {
                    this.save().await;
                });
            }
            ShortcutAction::Run => {
                let this = self.clone();
                self.spawn_action(action, async move {
                    this.run_all().await;
                });
            }
            ShortcutAction::ToggleFullscreen => {
                let fullscreen = self.toggle_fullscreen();
                tracing::debug!(fullscreen, "fullscreen toggled");
            }
        }
    }

    fn spawn_action<F>(&self, action: ShortcutAction, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(task);
            }
            Err(err) => {
                tracing::warn!(?action, error = %err, "shortcut dropped: no tokio runtime");
            }
        }
    }

    fn view(&self) -> std::sync::MutexGuard<'_, ViewModeController> {
        self.inner.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn prefs(&self) -> std::sync::MutexGuard<'_, ViewPreferences> {
        self.inner.prefs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
