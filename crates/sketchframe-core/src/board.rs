//! Board contents: committed strokes, frames and mirrored text boxes.

use crate::shapes::{
    Frame, FrameId, ShapeTrait, Stroke, StrokeId, StrokeTool, TextBox, now_millis,
};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything the engine knows is on the board.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    /// Committed strokes, keyed by ID.
    strokes: HashMap<StrokeId, Stroke>,
    /// Z-order of strokes (back to front).
    stroke_order: Vec<StrokeId>,
    /// Frames in insertion order. Z-order comes from `created_at`.
    frames: Vec<Frame>,
    /// Text elements owned by the host.
    #[serde(default)]
    text_boxes: Vec<TextBox>,
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Strokes ---

    /// Add a stroke on top of all others. Eraser strokes are refused.
    pub fn add_stroke(&mut self, stroke: Stroke) -> bool {
        if !stroke.tool.is_persisted() {
            return false;
        }
        let id = stroke.id();
        if self.strokes.insert(id, stroke).is_none() {
            self.stroke_order.push(id);
        }
        true
    }

    /// Replace all strokes, keeping the given order.
    pub fn load_strokes(&mut self, strokes: Vec<Stroke>) {
        self.strokes.clear();
        self.stroke_order.clear();
        for stroke in strokes {
            self.add_stroke(stroke);
        }
    }

    /// Remove a stroke.
    pub fn remove_stroke(&mut self, id: StrokeId) -> Option<Stroke> {
        self.stroke_order.retain(|&stroke_id| stroke_id != id);
        self.strokes.remove(&id)
    }

    /// Strokes in z-order (back to front).
    pub fn strokes_ordered(&self) -> impl Iterator<Item = &Stroke> {
        self.stroke_order.iter().filter_map(|id| self.strokes.get(id))
    }

    /// Owned copy of all strokes in z-order.
    pub fn stroke_list(&self) -> Vec<Stroke> {
        self.strokes_ordered().cloned().collect()
    }

    /// Number of committed strokes.
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Topmost stroke under a point, optionally restricted to one tool.
    pub fn stroke_at_point(
        &self,
        point: Point,
        tolerance: f64,
        tool: Option<StrokeTool>,
    ) -> Option<StrokeId> {
        self.stroke_order.iter().rev().copied().find(|id| {
            self.strokes.get(id).is_some_and(|stroke| {
                tool.is_none_or(|t| stroke.tool == t) && stroke.hit_test(point, tolerance)
            })
        })
    }

    // --- Frames ---

    /// Replace the frame list with the host's current one.
    ///
    /// Frames with a negative width or height are flipped to cover the
    /// same area.
    pub fn set_frames(&mut self, frames: Vec<Frame>) {
        self.frames = frames;
        for frame in &mut self.frames {
            frame.normalize();
        }
    }

    /// Add a frame.
    pub fn add_frame(&mut self, mut frame: Frame) {
        frame.normalize();
        self.frames.push(frame);
    }

    /// Get a frame by ID.
    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id() == id)
    }

    /// All frames in insertion order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Topmost frame containing a point.
    ///
    /// Frames are ranked by `created_at`, most recent first; equal timestamps
    /// fall back to insertion order, later first. Edges count as inside.
    pub fn frame_at_point(&self, point: Point) -> Option<&Frame> {
        self.frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| frame.contains(point))
            .max_by_key(|(index, frame)| (frame.created_at, *index))
            .map(|(_, frame)| frame)
    }

    /// Creation timestamp for a new frame that puts it above every existing one.
    pub fn next_frame_created_at(&self) -> u64 {
        let now = now_millis();
        match self.frames.iter().map(|f| f.created_at).max() {
            Some(top) if top >= now => top + 1,
            _ => now,
        }
    }

    /// Default display name for the next frame.
    pub fn next_frame_name(&self) -> String {
        format!("Frame {}", self.frames.len() + 1)
    }

    // --- Text ---

    /// Replace the mirrored text boxes.
    pub fn set_text_boxes(&mut self, text_boxes: Vec<TextBox>) {
        self.text_boxes = text_boxes;
    }

    /// Topmost text box under a point.
    pub fn text_box_at_point(&self, point: Point, tolerance: f64) -> Option<&TextBox> {
        self.text_boxes
            .iter()
            .rev()
            .find(|text| text.hit_test(point, tolerance))
    }

    // --- Whole board ---

    /// Bounding box of all strokes and frames.
    pub fn bounds(&self) -> Option<Rect> {
        let stroke_bounds = self.strokes.values().map(|s| s.bounds());
        let frame_bounds = self.frames.iter().map(|f| f.bounds());
        stroke_bounds
            .chain(frame_bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }

    /// Check if the board has no strokes and no frames.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.frames.is_empty()
    }

    /// Serialize the board to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a board from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Clamp a point into a frame, one axis at a time.
///
/// This is a clip, not a reject: a pointer dragged past the edge keeps
/// recording along that edge.
pub fn clip_to_frame(point: Point, frame: &Frame) -> Point {
    frame.clamp_point(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::SerializableColor;
    use uuid::Uuid;

    fn frame_at(rect: Rect, created_at: u64) -> Frame {
        let mut frame = Frame::new(rect, "F");
        frame.created_at = created_at;
        frame
    }

    fn pen(points: Vec<Point>) -> Stroke {
        Stroke::from_points(points).unwrap()
    }

    #[test]
    fn test_frame_at_point_prefers_latest_creation() {
        let mut board = Board::new();
        let newer = frame_at(Rect::new(0.0, 0.0, 100.0, 100.0), 200);
        let older = frame_at(Rect::new(50.0, 50.0, 150.0, 150.0), 100);
        let newer_id = newer.id();
        let older_id = older.id();
        // Insertion order deliberately disagrees with creation order
        board.add_frame(newer);
        board.add_frame(older);

        assert_eq!(board.frame_at_point(Point::new(75.0, 75.0)).map(|f| f.id()), Some(newer_id));
        assert_eq!(board.frame_at_point(Point::new(140.0, 140.0)).map(|f| f.id()), Some(older_id));
        assert!(board.frame_at_point(Point::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_frame_at_point_tie_goes_to_later_insertion() {
        let mut board = Board::new();
        let first = frame_at(Rect::new(0.0, 0.0, 100.0, 100.0), 100);
        let second = frame_at(Rect::new(0.0, 0.0, 100.0, 100.0), 100);
        let second_id = second.id();
        board.add_frame(first);
        board.add_frame(second);

        assert_eq!(board.frame_at_point(Point::new(10.0, 10.0)).map(|f| f.id()), Some(second_id));
    }

    #[test]
    fn test_frame_at_point_includes_edges() {
        let mut board = Board::new();
        board.add_frame(frame_at(Rect::new(0.0, 0.0, 100.0, 100.0), 1));
        assert!(board.frame_at_point(Point::new(100.0, 0.0)).is_some());
    }

    #[test]
    fn test_next_frame_created_at_is_topmost() {
        let mut board = Board::new();
        board.add_frame(frame_at(Rect::new(0.0, 0.0, 10.0, 10.0), u64::MAX - 10));
        assert_eq!(board.next_frame_created_at(), u64::MAX - 9);
    }

    #[test]
    fn test_next_frame_name() {
        let mut board = Board::new();
        assert_eq!(board.next_frame_name(), "Frame 1");
        board.add_frame(frame_at(Rect::new(0.0, 0.0, 10.0, 10.0), 1));
        assert_eq!(board.next_frame_name(), "Frame 2");
    }

    #[test]
    fn test_clip_to_frame() {
        let frame = frame_at(Rect::new(0.0, 0.0, 100.0, 100.0), 1);
        assert_eq!(clip_to_frame(Point::new(150.0, 50.0), &frame), Point::new(100.0, 50.0));
        assert_eq!(clip_to_frame(Point::new(-20.0, -30.0), &frame), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_set_frames_normalizes_negative_size() {
        let mut board = Board::new();
        let mut frame = Frame::new(Rect::new(0.0, 0.0, 100.0, 100.0), "F");
        frame.width = -10.0;
        board.set_frames(vec![frame]);

        let stored = &board.frames()[0];
        assert_eq!(stored.rect(), Rect::new(-10.0, 0.0, 0.0, 100.0));
        assert!(board.frame_at_point(Point::new(-5.0, 50.0)).is_some());
    }

    #[test]
    fn test_stroke_order_and_removal() {
        let mut board = Board::new();
        let a = pen(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        let b = pen(vec![Point::new(50.0, -50.0), Point::new(50.0, 50.0)]);
        let (a_id, b_id) = (a.id(), b.id());
        board.add_stroke(a);
        board.add_stroke(b);

        // Both cross (50, 0); the later one is on top
        assert_eq!(board.stroke_at_point(Point::new(50.0, 0.0), 2.0, None), Some(b_id));

        board.remove_stroke(b_id);
        assert_eq!(board.stroke_at_point(Point::new(50.0, 0.0), 2.0, None), Some(a_id));
        assert_eq!(board.stroke_count(), 1);
    }

    #[test]
    fn test_stroke_at_point_filters_tool() {
        let mut board = Board::new();
        let mut highlight = Stroke::new(
            StrokeTool::Highlighter,
            Point::new(0.0, 0.0),
            8.0,
            SerializableColor::black(),
        );
        highlight.add_point(Point::new(100.0, 0.0));
        board.add_stroke(highlight);

        assert!(board.stroke_at_point(Point::new(50.0, 0.0), 2.0, Some(StrokeTool::Pen)).is_none());
        assert!(board.stroke_at_point(Point::new(50.0, 0.0), 2.0, None).is_some());
    }

    #[test]
    fn test_refuses_eraser_strokes() {
        let mut board = Board::new();
        let eraser = Stroke::new(StrokeTool::Eraser, Point::ZERO, 2.0, SerializableColor::black());
        assert!(!board.add_stroke(eraser));
        assert!(board.is_empty());
    }

    #[test]
    fn test_text_box_hit() {
        let mut board = Board::new();
        let id = Uuid::new_v4();
        board.set_text_boxes(vec![TextBox::new(id, Rect::new(10.0, 10.0, 60.0, 30.0))]);
        assert_eq!(board.text_box_at_point(Point::new(20.0, 20.0), 0.0).map(|t| t.id), Some(id));
        assert!(board.text_box_at_point(Point::new(200.0, 20.0), 0.0).is_none());
    }

    #[test]
    fn test_bounds_cover_strokes_and_frames() {
        let mut board = Board::new();
        assert!(board.bounds().is_none());
        board.add_stroke(pen(vec![Point::new(-10.0, 0.0), Point::new(5.0, 5.0)]));
        board.add_frame(frame_at(Rect::new(0.0, 0.0, 100.0, 50.0), 1));
        assert_eq!(board.bounds(), Some(Rect::new(-10.0, 0.0, 100.0, 50.0)));
    }

    #[test]
    fn test_json_roundtrip_keeps_order() {
        let mut board = Board::new();
        let a = pen(vec![Point::new(0.0, 0.0)]);
        let b = pen(vec![Point::new(1.0, 1.0)]);
        let ids = vec![a.id(), b.id()];
        board.add_stroke(a);
        board.add_stroke(b);

        let restored = Board::from_json(&board.to_json().unwrap()).unwrap();
        let restored_ids: Vec<_> = restored.strokes_ordered().map(|s| s.id()).collect();
        assert_eq!(restored_ids, ids);
    }
}
