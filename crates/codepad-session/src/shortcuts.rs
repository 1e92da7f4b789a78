//! Global key bindings for save, run and fullscreen.
//!
//! The dispatcher is registered once. It holds a weak reference to its
//! [`ActionTarget`] and the target reads its current state when an action
//! fires, so state changes never require re-binding.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    Save,
    /// Run the whole buffer.
    Run,
    ToggleFullscreen,
}

/// A keydown as reported by the host: the key value plus modifier state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        KeyEvent {
            key: key.into(),
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }
}

/// Ctrl plus a key value. The key is compared exactly, so `Ctrl+Shift+S`
/// (key `"S"`) does not match `Ctrl+s`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub key: String,
}

impl KeyCombo {
    pub fn ctrl(key: impl Into<String>) -> Self {
        KeyCombo { key: key.into() }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.ctrl && event.key == self.key
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ctrl + {}", self.key.to_uppercase())
    }
}

/// What the host should do with a keydown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Bound combo; the action was handed to the target.
    Handled(ShortcutAction),
    /// Not ours; let the platform handle it.
    Ignored,
}

impl KeyDisposition {
    /// Every handled combo suppresses the platform default (for example the
    /// browser's own save dialog on Ctrl+S).
    pub fn prevent_default(self) -> bool {
        matches!(self, KeyDisposition::Handled(_))
    }
}

/// Receiver of shortcut actions.
pub trait ActionTarget: Send + Sync {
    /// Called on every bound keydown; must read current state, not state
    /// captured at registration.
    fn perform(self: Arc<Self>, action: ShortcutAction);
}

pub struct ShortcutDispatcher {
    bindings: Vec<(KeyCombo, ShortcutAction)>,
    target: RwLock<Option<Weak<dyn ActionTarget>>>,
}

impl ShortcutDispatcher {
    pub fn new(bindings: Vec<(KeyCombo, ShortcutAction)>) -> Self {
        ShortcutDispatcher {
            bindings,
            target: RwLock::new(None),
        }
    }

    /// Ctrl+S save, Ctrl+B run, Ctrl+F toggle fullscreen.
    pub fn with_default_bindings() -> Self {
        Self::new(vec![
            (KeyCombo::ctrl("s"), ShortcutAction::Save),
            (KeyCombo::ctrl("b"), ShortcutAction::Run),
            (KeyCombo::ctrl("f"), ShortcutAction::ToggleFullscreen),
        ])
    }

    pub fn bindings(&self) -> &[(KeyCombo, ShortcutAction)] {
        &self.bindings
    }

    pub fn register(&self, target: Weak<dyn ActionTarget>) {
        *self.target.write().unwrap_or_else(PoisonError::into_inner) = Some(target);
    }

    pub fn unregister(&self) {
        *self.target.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a live target is registered.
    pub fn is_registered(&self) -> bool {
        self.current_target().is_some()
    }

    pub fn dispatch(&self, event: &KeyEvent) -> KeyDisposition {
        let Some(action) = self
            .bindings
            .iter()
            .find(|(combo, _)| combo.matches(event))
            .map(|(_, action)| *action)
        else {
            return KeyDisposition::Ignored;
        };

        let Some(target) = self.current_target() else {
            tracing::debug!(?action, "shortcut ignored: no registered target");
            return KeyDisposition::Ignored;
        };

        tracing::debug!(?action, "shortcut dispatched");
        target.perform(action);
        KeyDisposition::Handled(action)
    }

    fn current_target(&self) -> Option<Arc<dyn ActionTarget>> {
        self.target
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade)
    }
}

impl Default for ShortcutDispatcher {
    fn default() -> Self {
        Self::with_default_bindings()
    }
}
