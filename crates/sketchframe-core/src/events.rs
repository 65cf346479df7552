//! Events the engine hands to its host.
//!
//! Every input handler returns the events it produced, in order. The engine
//! never waits on the consumer; persisting or broadcasting them is the host's
//! business.

use crate::shapes::{Frame, ShapeId, Stroke, StrokeId};
use crate::shortcuts::ViewState;
use crate::tools::ToolKind;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// An engine output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A stroke began; carries its first point.
    StrokeStarted { stroke: Stroke },
    /// Throttled live update; carries the whole in-progress stroke, simplified.
    StrokeUpdated { stroke: Stroke },
    /// A stroke gesture ended. `strokes` is the full board list after commit.
    StrokeFinalized { stroke: Stroke, strokes: Vec<Stroke> },
    /// The eraser removed a stroke.
    StrokeErased { id: StrokeId },
    /// A drawn frame passed the size check and was added to the board.
    FrameCreated { frame: Frame },
    /// Live broadcast of a newly created frame.
    FrameBroadcast { frame: Frame },
    /// Pointer position in canvas space, on every move.
    CursorMoved { position: Point },
    /// Sticky-note or text placement is delegated to the host.
    CanvasClicked { tool: ToolKind, position: Point },
    /// A text-tool click landed on existing text.
    TextSelected { id: ShapeId },
    /// The engine changed the active tool on its own.
    ToolChanged { tool: ToolKind },
    /// The camera moved or zoomed.
    CameraChanged { offset: Vec2, zoom: f64 },
    /// Grid or controls visibility changed.
    ViewChanged { view: ViewState },
}

impl EngineEvent {
    /// Short name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineEvent::StrokeStarted { .. } => "stroke_started",
            EngineEvent::StrokeUpdated { .. } => "stroke_updated",
            EngineEvent::StrokeFinalized { .. } => "stroke_finalized",
            EngineEvent::StrokeErased { .. } => "stroke_erased",
            EngineEvent::FrameCreated { .. } => "frame_created",
            EngineEvent::FrameBroadcast { .. } => "frame_broadcast",
            EngineEvent::CursorMoved { .. } => "cursor_moved",
            EngineEvent::CanvasClicked { .. } => "canvas_clicked",
            EngineEvent::TextSelected { .. } => "text_selected",
            EngineEvent::ToolChanged { .. } => "tool_changed",
            EngineEvent::CameraChanged { .. } => "camera_changed",
            EngineEvent::ViewChanged { .. } => "view_changed",
        }
    }
}
