//! The pointer pipeline: turns raw input into board mutations and events.
//!
//! [`Engine`] is driven from a single event loop. Each handler runs to
//! completion, mutates only engine-owned state, and returns the
//! [`EngineEvent`]s it produced in order. Nothing here blocks or awaits.

use crate::board::{Board, clip_to_frame};
use crate::camera::Camera;
use crate::config::{ConfigResult, EngineConfig};
use crate::events::EngineEvent;
use crate::input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent, is_space_key};
use crate::shapes::{Frame, ShapeTrait, Stroke, StrokeTool, TextBox};
use crate::shortcuts::{ShortcutAction, ShortcutRegistry, ViewState};
use crate::throttle::RealtimeThrottle;
use crate::tools::{ToolKind, ToolManager};
use kurbo::{Point, Rect, Size, Vec2};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

/// Transient state of the gesture between pointer-down and pointer-up.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging the viewport.
    Panning {
        /// Screen position of the previous pointer event.
        last_screen: Point,
    },
    /// Inking a pen or highlighter stroke that is not on the board yet.
    DrawingStroke {
        stroke: Stroke,
        throttle: RealtimeThrottle,
    },
    /// Dragging out a new frame from a fixed corner.
    CreatingFrame { start: Point, frame: Frame },
    /// Eraser held down; every stroke the pointer touches goes.
    Erasing,
}

impl GestureState {
    /// Whether dropping this gesture would lose a stroke or frame.
    fn has_pending_content(&self) -> bool {
        matches!(
            self,
            GestureState::DrawingStroke { .. } | GestureState::CreatingFrame { .. }
        )
    }
}

/// The drawing-canvas engine.
///
/// The camera and config are read-only from outside; zoom and pan go
/// through the engine so the camera limits always match the config.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    camera: Camera,
    pub board: Board,
    pub tools: ToolManager,
    pub input: InputState,
    pub view: ViewState,
    viewport: Size,
    gesture: GestureState,
    /// Button that started the current gesture.
    gesture_button: Option<MouseButton>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_valid_config(EngineConfig::default())
    }
}

impl Engine {
    /// Create an engine with an empty board.
    ///
    /// Fails if the config does not validate.
    pub fn new(config: EngineConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: EngineConfig) -> Self {
        Self {
            camera: Camera::with_limits(config.min_zoom, config.max_zoom),
            config,
            board: Board::new(),
            tools: ToolManager::new(),
            input: InputState::new(),
            view: ViewState::default(),
            viewport: Size::ZERO,
            gesture: GestureState::Idle,
            gesture_button: None,
        }
    }

    // --- Host inputs ---

    /// Set the active tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
    }

    /// Set the active tool by wire name. Unknown names leave the tool alone.
    pub fn set_tool_by_name(&mut self, name: &str) -> bool {
        match ToolKind::from_name(name) {
            Some(tool) => {
                self.set_tool(tool);
                true
            }
            None => {
                log::debug!("ignoring unknown tool {name:?}");
                false
            }
        }
    }

    /// Set the ink color for new strokes.
    pub fn set_color(&mut self, color: crate::shapes::SerializableColor) {
        self.tools.color = color;
    }

    /// Set the base stroke width for new strokes.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.tools.stroke_width = width;
    }

    /// Replace the frame list with the host's current one.
    pub fn set_frames(&mut self, frames: Vec<Frame>) {
        self.board.set_frames(frames);
    }

    /// Replace the host's text element bounds.
    pub fn set_text_boxes(&mut self, text_boxes: Vec<TextBox>) {
        self.board.set_text_boxes(text_boxes);
    }

    /// Replace the committed strokes.
    pub fn load_strokes(&mut self, strokes: Vec<Stroke>) {
        self.board.load_strokes(strokes);
    }

    /// Update the viewport size in screen pixels.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Update the held modifier keys.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.set_modifiers(modifiers);
    }

    // --- Queries ---

    /// Current gesture.
    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    /// Stroke being drawn, if any.
    pub fn active_stroke(&self) -> Option<&Stroke> {
        match &self.gesture {
            GestureState::DrawingStroke { stroke, .. } => Some(stroke),
            _ => None,
        }
    }

    /// Frame being dragged out, if any.
    pub fn pending_frame(&self) -> Option<&Frame> {
        match &self.gesture {
            GestureState::CreatingFrame { frame, .. } => Some(frame),
            _ => None,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Current tool.
    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    /// Viewport size in screen pixels.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    // --- Pointer pipeline ---

    /// Dispatch a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent, now: Instant) -> Vec<EngineEvent> {
        match event {
            PointerEvent::Down { position, button } => self.pointer_down(position, button, now),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position, button } => self.pointer_up(position, button),
            PointerEvent::Scroll { position, delta } => self.wheel(position, delta),
        }
    }

    /// Pointer pressed at a screen position.
    ///
    /// While a stroke or frame is in progress, presses of other buttons are
    /// ignored. A second press of the same button means its release was
    /// lost, so the open gesture is finished first.
    pub fn pointer_down(&mut self, position: Point, button: MouseButton, now: Instant) -> Vec<EngineEvent> {
        if !position.is_finite() {
            return Vec::new();
        }

        let mut events = Vec::new();
        if self.gesture.has_pending_content() {
            if self.gesture_button != Some(button) {
                log::trace!("ignoring {button:?} press during an active gesture");
                return events;
            }
            log::debug!("pointer-up never arrived, finishing open gesture");
            events.extend(self.finish_gesture(None));
        }

        if button == MouseButton::Right {
            return events;
        }

        self.input
            .handle_pointer_event(&PointerEvent::Down { position, button });
        self.start_gesture(position, button, now, &mut events);
        self.gesture_button = match self.gesture {
            GestureState::Idle => None,
            _ => Some(button),
        };
        events
    }

    fn start_gesture(&mut self, position: Point, button: MouseButton, now: Instant, events: &mut Vec<EngineEvent>) {
        let space_pan = self.input.is_space_held() && button == MouseButton::Left;
        if space_pan || button == MouseButton::Middle {
            self.gesture = GestureState::Panning {
                last_screen: position,
            };
            return;
        }

        self.gesture = GestureState::Idle;
        let world = self.camera.screen_to_world(position);
        let tool = self.tools.current_tool;

        if tool.auto_switches_to_pen() {
            if let Some(id) = self
                .board
                .stroke_at_point(world, self.config.hit_tolerance, Some(StrokeTool::Pen))
            {
                let guard = Duration::from_millis(self.config.activation_guard_ms);
                if self.tools.try_activate_stroke(id, now, guard) {
                    log::debug!("pointer landed on pen stroke {id}, switching to pen");
                    self.tools.set_tool(ToolKind::Pen);
                    events.push(EngineEvent::ToolChanged {
                        tool: ToolKind::Pen,
                    });
                } else {
                    log::trace!("ignoring repeated activation of stroke {id}");
                }
                return;
            }
        }

        match tool {
            ToolKind::Select => {
                self.gesture = GestureState::Panning {
                    last_screen: position,
                };
            }
            ToolKind::StickyNote => {
                events.push(EngineEvent::CanvasClicked {
                    tool,
                    position: world,
                });
            }
            ToolKind::Text => {
                match self.board.text_box_at_point(world, self.config.hit_tolerance) {
                    Some(text) => {
                        events.push(EngineEvent::TextSelected { id: text.id });
                        self.tools.set_tool(ToolKind::Select);
                        events.push(EngineEvent::ToolChanged {
                            tool: ToolKind::Select,
                        });
                    }
                    None => events.push(EngineEvent::CanvasClicked {
                        tool,
                        position: world,
                    }),
                }
            }
            ToolKind::Frame => {
                log::debug!("frame creation started at {world:?}");
                self.gesture = GestureState::CreatingFrame {
                    start: world,
                    frame: Frame::begin(world),
                };
            }
            ToolKind::Pen | ToolKind::Highlighter => {
                if let Some(stroke_tool) = tool.stroke_tool() {
                    let mut stroke = Stroke::new(
                        stroke_tool,
                        world,
                        self.tools.stroke_width_for(stroke_tool),
                        self.tools.color,
                    );
                    stroke.frame_id = self.board.frame_at_point(world).map(|frame| frame.id());

                    let mut throttle = RealtimeThrottle::new(self.config.throttle_distance);
                    throttle.anchor(world);

                    log::debug!("stroke {} started at {world:?}", stroke.id());
                    events.push(EngineEvent::StrokeStarted {
                        stroke: stroke.clone(),
                    });
                    self.gesture = GestureState::DrawingStroke { stroke, throttle };
                }
            }
            ToolKind::Eraser => {
                erase_at(&mut self.board, world, self.config.hit_tolerance, events);
                self.gesture = GestureState::Erasing;
            }
        }
    }

    /// Pointer moved to a screen position.
    pub fn pointer_move(&mut self, position: Point) -> Vec<EngineEvent> {
        if !position.is_finite() {
            return Vec::new();
        }
        self.input.handle_pointer_event(&PointerEvent::Move { position });

        let world = self.camera.screen_to_world(position);
        let mut events = vec![EngineEvent::CursorMoved { position: world }];

        match &mut self.gesture {
            GestureState::Idle => {}
            GestureState::Panning { last_screen } => {
                let delta = position - *last_screen;
                *last_screen = position;
                if delta != Vec2::ZERO {
                    self.camera.pan(delta);
                    events.push(EngineEvent::CameraChanged {
                        offset: self.camera.offset,
                        zoom: self.camera.zoom,
                    });
                }
            }
            GestureState::CreatingFrame { start, frame } => {
                frame.resize_from_corners(*start, world);
            }
            GestureState::DrawingStroke { stroke, throttle } => {
                let point = match stroke.frame_id.and_then(|id| self.board.frame(id)) {
                    Some(frame) => clip_to_frame(world, frame),
                    None => world,
                };
                stroke.add_point(point);

                if throttle.should_emit(point) {
                    log::trace!("live update for stroke {} at {point:?}", stroke.id());
                    events.push(EngineEvent::StrokeUpdated {
                        stroke: stroke.simplified(self.config.realtime_tolerance),
                    });
                }
            }
            GestureState::Erasing => {
                erase_at(&mut self.board, world, self.config.hit_tolerance, &mut events);
            }
        }

        events
    }

    /// Pointer released. Ends the current gesture if `button` started it;
    /// releases of other buttons are ignored.
    pub fn pointer_up(&mut self, position: Point, button: MouseButton) -> Vec<EngineEvent> {
        let resolved = position.is_finite().then_some(position);
        self.input.handle_pointer_event(&PointerEvent::Up {
            position: resolved.unwrap_or(self.input.pointer_position),
            button,
        });

        if self.gesture_button.is_some_and(|started| started != button) {
            log::trace!("ignoring {button:?} release during an active gesture");
            return Vec::new();
        }
        self.finish_gesture(resolved)
    }

    /// Commit whatever the current gesture produced and return to idle.
    fn finish_gesture(&mut self, release: Option<Point>) -> Vec<EngineEvent> {
        self.gesture_button = None;
        let mut events = Vec::new();
        match std::mem::take(&mut self.gesture) {
            GestureState::CreatingFrame { start, mut frame } => {
                if let Some(position) = release {
                    frame.resize_from_corners(start, self.camera.screen_to_world(position));
                }
                if frame.meets_min_size(self.config.min_frame_size) {
                    frame.finalize(self.board.next_frame_name(), self.board.next_frame_created_at());
                    log::debug!(
                        "frame {} created: {}x{} at ({}, {})",
                        frame.id(),
                        frame.width,
                        frame.height,
                        frame.x,
                        frame.y
                    );
                    self.board.add_frame(frame.clone());
                    events.push(EngineEvent::FrameCreated {
                        frame: frame.clone(),
                    });
                    events.push(EngineEvent::FrameBroadcast { frame });
                } else {
                    log::debug!(
                        "discarding frame below minimum size: {}x{}",
                        frame.width,
                        frame.height
                    );
                }
            }
            GestureState::DrawingStroke { mut stroke, .. } => {
                stroke.simplify(self.config.storage_tolerance);
                log::debug!("stroke {} finalized with {} points", stroke.id(), stroke.len());
                self.board.add_stroke(stroke.clone());
                events.push(EngineEvent::StrokeFinalized {
                    stroke,
                    strokes: self.board.stroke_list(),
                });
            }
            GestureState::Idle | GestureState::Panning { .. } | GestureState::Erasing => {}
        }

        events
    }

    /// Wheel or trackpad scroll: zoom around the pointer.
    pub fn wheel(&mut self, position: Point, delta: Vec2) -> Vec<EngineEvent> {
        if !position.is_finite() || !delta.is_finite() || delta.y == 0.0 {
            return Vec::new();
        }
        let step = self.config.wheel_zoom_step;
        let factor = if delta.y < 0.0 { step } else { 1.0 / step };
        self.camera.zoom_at(position, factor);
        vec![self.camera_event()]
    }

    // --- Keyboard ---

    /// Dispatch a key event.
    pub fn handle_key_event(&mut self, event: KeyEvent, modifiers: Modifiers, now: Instant) -> Vec<EngineEvent> {
        match event {
            KeyEvent::Pressed(key) => self.key_down(&key, modifiers, now),
            KeyEvent::Released(key) => self.key_up(&key, modifiers),
        }
    }

    /// Key pressed.
    pub fn key_down(&mut self, key: &str, modifiers: Modifiers, now: Instant) -> Vec<EngineEvent> {
        self.input.set_modifiers(modifiers);
        self.input
            .handle_key_event(&KeyEvent::Pressed(key.to_string()));
        if is_space_key(key) {
            return Vec::new();
        }
        match ShortcutRegistry::resolve(key, modifiers) {
            Some(action) => self.apply_shortcut(action, now),
            None => Vec::new(),
        }
    }

    /// Key released. Releasing space cancels an in-progress pan.
    pub fn key_up(&mut self, key: &str, modifiers: Modifiers) -> Vec<EngineEvent> {
        self.input.set_modifiers(modifiers);
        if is_space_key(key) {
            self.input.release_space();
            if matches!(self.gesture, GestureState::Panning { .. }) {
                log::debug!("space released, pan cancelled");
                self.gesture = GestureState::Idle;
                self.gesture_button = None;
            }
        } else {
            self.input
                .handle_key_event(&KeyEvent::Released(key.to_string()));
        }
        Vec::new()
    }

    /// Run a shortcut action.
    pub fn apply_shortcut(&mut self, action: ShortcutAction, now: Instant) -> Vec<EngineEvent> {
        match action {
            ShortcutAction::ResetZoom => self.reset_zoom(now),
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::ToggleGrid => {
                self.view.show_grid = !self.view.show_grid;
                vec![EngineEvent::ViewChanged { view: self.view }]
            }
            ShortcutAction::ToggleControls => {
                self.view.show_controls = !self.view.show_controls;
                vec![EngineEvent::ViewChanged { view: self.view }]
            }
        }
    }

    // --- Viewport ---

    /// Zoom in one step around the viewport center.
    pub fn zoom_in(&mut self) -> Vec<EngineEvent> {
        if self.viewport.is_zero_area() {
            return Vec::new();
        }
        self.camera.zoom_in(self.viewport, self.config.zoom_step);
        vec![self.camera_event()]
    }

    /// Zoom out one step around the viewport center.
    pub fn zoom_out(&mut self) -> Vec<EngineEvent> {
        if self.viewport.is_zero_area() {
            return Vec::new();
        }
        self.camera.zoom_out(self.viewport, self.config.zoom_step);
        vec![self.camera_event()]
    }

    /// Start animating back to 100% at the origin. Drive it with [`Engine::tick`].
    pub fn reset_zoom(&mut self, now: Instant) -> Vec<EngineEvent> {
        self.camera
            .animate_reset(now, Duration::from_millis(self.config.reset_animation_ms));
        if self.camera.is_animating() {
            Vec::new()
        } else {
            vec![self.camera_event()]
        }
    }

    /// Fit the camera around a canvas-space rectangle.
    pub fn fit_to_bounds(&mut self, bounds: Rect) -> Vec<EngineEvent> {
        if self.viewport.is_zero_area() {
            return Vec::new();
        }
        self.camera.fit_to_bounds(
            bounds,
            self.viewport,
            self.config.fit_padding,
            self.config.fit_max_zoom,
        );
        vec![self.camera_event()]
    }

    /// Fit the camera around everything on the board.
    pub fn fit_to_screen(&mut self) -> Vec<EngineEvent> {
        match self.board.bounds() {
            Some(bounds) => self.fit_to_bounds(bounds),
            None => Vec::new(),
        }
    }

    /// Advance camera animations. Call once per rendered frame.
    pub fn tick(&mut self, now: Instant) -> Vec<EngineEvent> {
        if self.camera.tick(now) {
            vec![self.camera_event()]
        } else {
            Vec::new()
        }
    }

    fn camera_event(&self) -> EngineEvent {
        EngineEvent::CameraChanged {
            offset: self.camera.offset,
            zoom: self.camera.zoom,
        }
    }
}

/// Remove the topmost stroke under `point`, if any.
fn erase_at(board: &mut Board, point: Point, tolerance: f64, events: &mut Vec<EngineEvent>) {
    if let Some(id) = board.stroke_at_point(point, tolerance, None) {
        board.remove_stroke(id);
        log::debug!("erased stroke {id}");
        events.push(EngineEvent::StrokeErased { id });
    }
}
