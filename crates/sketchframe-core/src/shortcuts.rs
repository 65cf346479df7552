//! Keyboard shortcut registry and view toggles.
//!
//! Shortcuts only touch the camera, the tool and view flags. They never
//! change drawing content.

use crate::input::Modifiers;
use serde::{Deserialize, Serialize};

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutAction {
    ResetZoom,
    ZoomIn,
    ZoomOut,
    ToggleGrid,
    ToggleControls,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+0").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// Check a key press against this shortcut.
    ///
    /// Ctrl and Cmd are interchangeable. Shift is only checked when the
    /// shortcut asks for it, since symbol keys like `+` already need it on
    /// most layouts.
    pub fn matches(&self, key: &str, modifiers: Modifiers) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == modifiers.command()
            && (!self.shift || modifiers.shift)
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("0", true, false, ShortcutAction::ResetZoom, "Reset zoom"),
            Shortcut::new("=", true, false, ShortcutAction::ZoomIn, "Zoom in"),
            Shortcut::new("+", true, false, ShortcutAction::ZoomIn, "Zoom in"),
            Shortcut::new("-", true, false, ShortcutAction::ZoomOut, "Zoom out"),
            Shortcut::new("'", true, false, ShortcutAction::ToggleGrid, "Toggle grid"),
            Shortcut::new(".", true, false, ShortcutAction::ToggleControls, "Toggle controls"),
        ]
    }

    /// Find the action bound to a key press.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(key, modifiers))
            .map(|shortcut| shortcut.action)
    }

    /// One line per shortcut, for help output.
    pub fn describe_all() -> Vec<String> {
        Self::all()
            .iter()
            .map(|shortcut| format!("{:20} {}", shortcut.format(), shortcut.description))
            .collect()
    }
}

/// View flags toggled by shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub show_grid: bool,
    pub show_controls: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_controls: true,
        }
    }
}
