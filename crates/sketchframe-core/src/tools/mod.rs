//! Tool system for the drawing canvas.

use crate::shapes::{SerializableColor, StrokeId, StrokeTool};
use serde::{Deserialize, Serialize};

// Use web-time on WASM, std::time otherwise
#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    #[default]
    Select,
    Pen,
    Highlighter,
    Eraser,
    StickyNote,
    Frame,
    Text,
}

impl ToolKind {
    /// Every tool, in toolbar order.
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Select,
        ToolKind::Pen,
        ToolKind::Highlighter,
        ToolKind::Eraser,
        ToolKind::StickyNote,
        ToolKind::Frame,
        ToolKind::Text,
    ];

    /// Wire name of the tool.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pen => "pen",
            ToolKind::Highlighter => "highlighter",
            ToolKind::Eraser => "eraser",
            ToolKind::StickyNote => "sticky-note",
            ToolKind::Frame => "frame",
            ToolKind::Text => "text",
        }
    }

    /// Parse a wire name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// The stroke kind this tool produces, if it draws ink.
    pub fn stroke_tool(self) -> Option<StrokeTool> {
        match self {
            ToolKind::Pen => Some(StrokeTool::Pen),
            ToolKind::Highlighter => Some(StrokeTool::Highlighter),
            ToolKind::Eraser => Some(StrokeTool::Eraser),
            ToolKind::Select | ToolKind::StickyNote | ToolKind::Frame | ToolKind::Text => None,
        }
    }

    /// Whether landing on a pen stroke with this tool switches to the pen.
    ///
    /// The pen already draws and the eraser needs the hit to erase.
    pub fn auto_switches_to_pen(self) -> bool {
        !matches!(self, ToolKind::Pen | ToolKind::Eraser)
    }
}

/// Manages the current tool and the ink settings applied to new strokes.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Ink color for new strokes.
    pub color: SerializableColor,
    /// Base stroke width for new strokes.
    pub stroke_width: f64,
    /// Last stroke that triggered a pen auto-switch, and when.
    last_activation: Option<(StrokeId, Instant)>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            color: SerializableColor::black(),
            stroke_width: 2.0,
            last_activation: None,
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
    }

    /// Effective width for a stroke drawn with `tool`.
    pub fn stroke_width_for(&self, tool: StrokeTool) -> f64 {
        match tool {
            StrokeTool::Highlighter => self.stroke_width * 2.0,
            StrokeTool::Pen | StrokeTool::Eraser => self.stroke_width,
        }
    }

    /// Register a pen auto-switch on `stroke`.
    ///
    /// Returns false when the same stroke was activated less than `guard`
    /// ago; the caller should then drop the pointer-down entirely.
    pub fn try_activate_stroke(&mut self, stroke: StrokeId, now: Instant, guard: Duration) -> bool {
        if let Some((last_stroke, last_time)) = self.last_activation {
            if last_stroke == stroke && now.saturating_duration_since(last_time) < guard {
                return false;
            }
        }
        self.last_activation = Some((stroke, now));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_tool_selection() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.current_tool, ToolKind::Select);

        tm.set_tool(ToolKind::Frame);
        assert_eq!(tm.current_tool, ToolKind::Frame);
    }

    #[test]
    fn test_names_roundtrip() {
        for tool in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(tool.name()), Some(tool));
            let json = serde_json::to_string(&tool).unwrap();
            assert_eq!(json, format!("\"{}\"", tool.name()));
        }
        assert_eq!(ToolKind::from_name("lasso"), None);
    }

    #[test]
    fn test_highlighter_doubles_width() {
        let mut tm = ToolManager::new();
        tm.stroke_width = 3.0;
        assert!((tm.stroke_width_for(StrokeTool::Pen) - 3.0).abs() < f64::EPSILON);
        assert!((tm.stroke_width_for(StrokeTool::Highlighter) - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_auto_switch_tools() {
        assert!(!ToolKind::Pen.auto_switches_to_pen());
        assert!(!ToolKind::Eraser.auto_switches_to_pen());
        assert!(ToolKind::Select.auto_switches_to_pen());
        assert!(ToolKind::Highlighter.auto_switches_to_pen());
    }

    #[test]
    fn test_activation_guard() {
        let mut tm = ToolManager::new();
        let guard = Duration::from_millis(100);
        let stroke = Uuid::new_v4();
        let other = Uuid::new_v4();
        let t0 = Instant::now();

        assert!(tm.try_activate_stroke(stroke, t0, guard));
        assert!(!tm.try_activate_stroke(stroke, t0 + Duration::from_millis(50), guard));
        // A different stroke is not guarded
        assert!(tm.try_activate_stroke(other, t0 + Duration::from_millis(60), guard));
        assert!(tm.try_activate_stroke(stroke, t0 + Duration::from_millis(200), guard));
    }
}
