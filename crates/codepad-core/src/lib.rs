pub mod error;
pub mod execution;
pub mod id;
pub mod layout;
pub mod output;
pub mod project;
pub mod selection;
pub mod theme;

// Re-export commonly used types
pub use error::EditorError;
pub use execution::{ExecutionPhase, ExecutionRequest, ExecutionResult};
pub use id::ProjectId;
pub use layout::{CompactPanel, LayoutMode, OutputConfig, ViewModeController, ViewPreferences};
pub use output::{format_output, OutputKind, OutputLine};
pub use project::{EditableBuffer, Project};
pub use selection::{resolve_run_target, SelectionTracker};
pub use theme::Theme;
