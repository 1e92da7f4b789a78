//! Viewport-driven layout mode and editor view preferences.
//!
//! [`ViewModeController`] is pure derived state: the layout is a function of
//! the last reported width plus the compact-mode panel choice. Nothing here
//! depends on execution state.

use serde::{Deserialize, Serialize};

/// Widths below this render the compact, one-panel layout.
pub const COMPACT_BREAKPOINT: u32 = 768;

pub const DEFAULT_FONT_SIZE: u16 = 16;
pub const MIN_FONT_SIZE: u16 = 12;
pub const MAX_FONT_SIZE: u16 = 24;
pub const FONT_SIZE_STEP: u16 = 2;
/// Compact layouts never render the editor smaller than this.
pub const COMPACT_MIN_FONT_SIZE: u16 = 16;

/// Panel shown in compact mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompactPanel {
    #[default]
    Editor,
    Output,
}

impl CompactPanel {
    pub fn other(self) -> Self {
        match self {
            CompactPanel::Editor => CompactPanel::Output,
            CompactPanel::Output => CompactPanel::Editor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "panel")]
pub enum LayoutMode {
    /// One panel at a time.
    Compact(CompactPanel),
    /// Editor and output side by side.
    SideBySide,
}

impl LayoutMode {
    pub fn for_width(width: u32, panel: CompactPanel) -> Self {
        if width < COMPACT_BREAKPOINT {
            LayoutMode::Compact(panel)
        } else {
            LayoutMode::SideBySide
        }
    }

    pub fn is_compact(self) -> bool {
        matches!(self, LayoutMode::Compact(_))
    }

    pub fn editor_visible(self) -> bool {
        matches!(
            self,
            LayoutMode::SideBySide | LayoutMode::Compact(CompactPanel::Editor)
        )
    }

    pub fn output_visible(self) -> bool {
        matches!(
            self,
            LayoutMode::SideBySide | LayoutMode::Compact(CompactPanel::Output)
        )
    }
}

/// Tracks viewport width and the compact-mode panel choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModeController {
    width: u32,
    panel: CompactPanel,
}

impl ViewModeController {
    pub fn new(width: u32) -> Self {
        ViewModeController {
            width,
            panel: CompactPanel::default(),
        }
    }

    /// Records a resize event and returns the recomputed layout.
    ///
    /// The compact panel choice is kept across resizes, so shrinking back
    /// below the breakpoint restores the panel the user last picked.
    pub fn resize(&mut self, width: u32) -> LayoutMode {
        self.width = width;
        self.mode()
    }

    pub fn mode(&self) -> LayoutMode {
        LayoutMode::for_width(self.width, self.panel)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn panel(&self) -> CompactPanel {
        self.panel
    }

    pub fn toggle_panel(&mut self) -> LayoutMode {
        self.panel = self.panel.other();
        self.mode()
    }

    pub fn show_panel(&mut self, panel: CompactPanel) -> LayoutMode {
        self.panel = panel;
        self.mode()
    }
}

/// Output panel rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub wrap: bool,
    pub font_size: u16,
    pub show_line_numbers: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            wrap: true,
            font_size: 14,
            show_line_numbers: true,
        }
    }
}

/// Editor font size, fullscreen flag and output panel options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewPreferences {
    pub font_size: u16,
    pub fullscreen: bool,
    pub output: OutputConfig,
}

impl Default for ViewPreferences {
    fn default() -> Self {
        ViewPreferences {
            font_size: DEFAULT_FONT_SIZE,
            fullscreen: false,
            output: OutputConfig::default(),
        }
    }
}

impl ViewPreferences {
    pub fn increase_font(&mut self) -> u16 {
        self.font_size = (self.font_size + FONT_SIZE_STEP).min(MAX_FONT_SIZE);
        self.font_size
    }

    pub fn decrease_font(&mut self) -> u16 {
        self.font_size = self
            .font_size
            .saturating_sub(FONT_SIZE_STEP)
            .max(MIN_FONT_SIZE);
        self.font_size
    }

    /// Font size the editor actually renders at for the given layout.
    pub fn effective_font_size(&self, mode: LayoutMode) -> u16 {
        if mode.is_compact() {
            self.font_size.max(COMPACT_MIN_FONT_SIZE)
        } else {
            self.font_size
        }
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    pub fn toggle_wrap(&mut self) -> bool {
        self.output.wrap = !self.output.wrap;
        self.output.wrap
    }
}
