//! Freehand ink strokes.

use super::{FrameId, SerializableColor, ShapeId, ShapeTrait, point_to_polyline_dist};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for strokes.
pub type StrokeId = ShapeId;

/// The drawing tool a stroke was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeTool {
    Pen,
    Highlighter,
    Eraser,
}

impl StrokeTool {
    /// Eraser strokes only locate victims and never reach the board.
    pub fn is_persisted(self) -> bool {
        !matches!(self, StrokeTool::Eraser)
    }
}

/// A freehand stroke.
///
/// Always holds at least one point. Points are appended in input order while
/// drawing and serialize as a flat `[x0, y0, x1, y1, ...]` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: StrokeId,
    #[serde(with = "flat_points")]
    points: Vec<Point>,
    /// Tool that produced the stroke.
    pub tool: StrokeTool,
    /// Effective stroke width (already doubled for highlighter).
    pub stroke_width: f64,
    /// Ink color.
    pub color: SerializableColor,
    /// Frame the stroke was started in, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<FrameId>,
}

impl Stroke {
    /// Start a new stroke at a single point.
    pub fn new(tool: StrokeTool, start: Point, stroke_width: f64, color: SerializableColor) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![start],
            tool,
            stroke_width,
            color,
            frame_id: None,
        }
    }

    /// Build a pen stroke from existing points. Returns `None` for an empty list.
    pub fn from_points(points: Vec<Point>) -> Option<Self> {
        let first = *points.first()?;
        let mut stroke = Self::new(StrokeTool::Pen, first, 2.0, SerializableColor::black());
        stroke.points = points;
        Some(stroke)
    }

    /// Stroke points in canvas space.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Add a point to the end of the stroke.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// A single-point stroke is a dot.
    pub fn is_dot(&self) -> bool {
        self.points.len() == 1
    }

    /// First recorded point.
    pub fn first_point(&self) -> Point {
        self.points[0]
    }

    /// Last recorded point.
    pub fn last_point(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Points flattened to `[x0, y0, x1, y1, ...]`.
    pub fn flat_points(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y]).collect()
    }

    /// Reduce point density in place. Endpoints are always kept.
    pub fn simplify(&mut self, tolerance: f64) {
        self.points = simplify_points(&self.points, tolerance);
    }

    /// Copy of this stroke with reduced point density.
    pub fn simplified(&self, tolerance: f64) -> Self {
        Self {
            points: simplify_points(&self.points, tolerance),
            ..self.clone()
        }
    }
}

/// Greedy radial simplification.
///
/// Keeps the first point, then every point farther than `tolerance` from the
/// last kept one, then the last point regardless of distance. Two or fewer
/// points come back unchanged.
pub fn simplify_points(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points[points.len() - 1];
    let mut kept = Vec::with_capacity(points.len());
    kept.push(points[0]);
    let mut anchor = points[0];

    for &point in &points[1..points.len() - 1] {
        if point.distance(anchor) > tolerance {
            kept.push(point);
            anchor = point;
        }
    }

    kept.push(last);
    kept
}

impl ShapeTrait for Stroke {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let first = self.points[0];
        self.points
            .iter()
            .fold(Rect::from_points(first, first), |acc, p| acc.union_pt(*p))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_polyline_dist(point, &self.points) <= tolerance + self.stroke_width / 2.0
    }
}

mod flat_points {
    use kurbo::Point;
    use serde::de::Error as _;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(points.len() * 2))?;
        for point in points {
            seq.serialize_element(&point.x)?;
            seq.serialize_element(&point.y)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
        let flat = Vec::<f64>::deserialize(deserializer)?;
        if flat.is_empty() || flat.len() % 2 != 0 {
            return Err(D::Error::custom(format!(
                "stroke points must be a non-empty list of x/y pairs, got {} values",
                flat.len()
            )));
        }
        Ok(flat.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal(count: usize, step: f64) -> Vec<Point> {
        (0..count)
            .map(|i| Point::new(10.0 + i as f64 * step, 10.0 + i as f64 * step))
            .collect()
    }

    #[test]
    fn test_new_stroke_is_dot() {
        let stroke = Stroke::new(StrokeTool::Pen, Point::new(3.0, 4.0), 2.0, SerializableColor::black());
        assert!(stroke.is_dot());
        assert_eq!(stroke.flat_points(), vec![3.0, 4.0]);
    }

    #[test]
    fn test_from_empty_points() {
        assert!(Stroke::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_simplify_keeps_endpoints() {
        let points = diagonal(51, 1.0);
        let simplified = simplify_points(&points, 2.0);
        assert_eq!(simplified.first(), points.first());
        assert_eq!(simplified.last(), points.last());
        assert!(simplified.len() < points.len());
    }

    #[test]
    fn test_simplify_keeps_close_last_point() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.5, 0.0),
        ];
        let simplified = simplify_points(&points, 3.0);
        assert_eq!(simplified, points);
    }

    #[test]
    fn test_simplify_drops_clustered_points() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.5, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.5, 0.0),
            Point::new(20.0, 0.0),
        ];
        let simplified = simplify_points(&points, 2.0);
        assert_eq!(simplified, vec![Point::new(0.0, 0.0), Point::new(20.0, 0.0)]);
    }

    #[test]
    fn test_short_strokes_unchanged() {
        let one = vec![Point::new(1.0, 1.0)];
        assert_eq!(simplify_points(&one, 100.0), one);
        let two = vec![Point::new(1.0, 1.0), Point::new(1.1, 1.0)];
        assert_eq!(simplify_points(&two, 100.0), two);
    }

    #[test]
    fn test_coarser_tolerance_keeps_fewer_points() {
        let points = diagonal(100, 1.0);
        let storage = simplify_points(&points, 2.0);
        let realtime = simplify_points(&points, 3.0);
        assert!(realtime.len() < storage.len());
    }

    #[test]
    fn test_bounds() {
        let stroke = Stroke::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
        ])
        .unwrap();

        let bounds = stroke.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let stroke = Stroke::from_points(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]).unwrap();

        assert!(stroke.hit_test(Point::new(50.0, 0.0), 5.0));
        assert!(stroke.hit_test(Point::new(50.0, 5.5), 5.0)); // inside half width
        assert!(!stroke.hit_test(Point::new(50.0, 20.0), 5.0));
    }

    #[test]
    fn test_serializes_flat_points() {
        let mut stroke = Stroke::new(StrokeTool::Highlighter, Point::new(1.0, 2.0), 8.0, SerializableColor::black());
        stroke.add_point(Point::new(3.0, 4.0));

        let json = serde_json::to_value(&stroke).unwrap();
        assert_eq!(json["points"], serde_json::json!([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(json["tool"], "highlighter");
        assert!(json.get("frame_id").is_none());

        let back: Stroke = serde_json::from_value(json).unwrap();
        assert_eq!(back, stroke);
    }

    #[test]
    fn test_rejects_odd_flat_points() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "points": [1.0, 2.0, 3.0],
            "tool": "pen",
            "stroke_width": 2.0,
            "color": { "r": 0, "g": 0, "b": 0, "a": 255 },
        });
        assert!(serde_json::from_value::<Stroke>(json).is_err());
    }

    #[test]
    fn test_eraser_is_not_persisted() {
        assert!(StrokeTool::Pen.is_persisted());
        assert!(StrokeTool::Highlighter.is_persisted());
        assert!(!StrokeTool::Eraser.is_persisted());
    }
}
