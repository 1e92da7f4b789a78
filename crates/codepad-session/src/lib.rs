//! Execution and persistence orchestration for the code editing surface.
//!
//! Wires the remote clients from `codepad-client` into the stateful pieces
//! the view talks to:
//! - [`state_machine::ExecutionStateMachine`] for the guarded run lifecycle
//! - [`project_store::ProjectStore`] for load/save and save-state tracking
//! - [`shortcuts::ShortcutDispatcher`] for global key bindings
//! - [`settings::Settings`] for the persisted token and theme
//! - [`controller::EditorController`], the single facade every UI
//!   affordance calls into

pub mod config;
pub mod controller;
pub mod notify;
pub mod project_store;
pub mod settings;
pub mod shortcuts;
pub mod state_machine;
pub mod timer;

pub use config::ClientConfig;
pub use controller::{ControllerParts, EditorController, SaveOutcome};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use project_store::{ProjectStore, SaveState};
pub use settings::{Settings, SettingsError};
pub use shortcuts::{
    ActionTarget, KeyCombo, KeyDisposition, KeyEvent, ShortcutAction, ShortcutDispatcher,
};
pub use state_machine::{ExecutionStateMachine, RunOutcome, RunSnapshot, RunTiming, StartOutcome};
pub use timer::{ImmediateTimer, Timer, TokioTimer};
