//! SketchFrame Core Library
//!
//! Platform-agnostic engine for an infinite drawing canvas: pointer input in,
//! strokes, frames and camera changes out. Rendering, persistence and
//! networking belong to the host.

pub mod board;
pub mod camera;
pub mod config;
pub mod engine;
pub mod events;
pub mod input;
pub mod shapes;
pub mod shortcuts;
pub mod throttle;
pub mod tools;

pub use board::{Board, clip_to_frame};
pub use camera::Camera;
pub use config::{ConfigError, ConfigResult, EngineConfig};
pub use engine::{Engine, GestureState};
pub use events::EngineEvent;
pub use input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use shapes::{
    Frame, FrameId, FrameMetadata, FrameStatus, FrameStyle, SerializableColor, ShapeId, ShapeTrait,
    Stroke, StrokeId, StrokeTool, TextBox, simplify_points,
};
pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry, ViewState};
pub use throttle::RealtimeThrottle;
pub use tools::{ToolKind, ToolManager};
