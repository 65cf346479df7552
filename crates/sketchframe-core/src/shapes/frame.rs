//! Frame containers.

use super::{SerializableColor, ShapeId, ShapeTrait, rect_contains_closed};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for frames.
pub type FrameId = ShapeId;

/// Wall-clock milliseconds since the UNIX epoch.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Visual attributes of a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameStyle {
    /// Background fill (None = transparent).
    pub fill: Option<SerializableColor>,
    /// Border color.
    pub stroke_color: SerializableColor,
    /// Border width.
    pub stroke_width: f64,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            fill: Some(SerializableColor::white()),
            stroke_color: SerializableColor::new(160, 160, 160, 255),
            stroke_width: 1.0,
        }
    }
}

/// Review status of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    #[default]
    Draft,
    InProgress,
    Review,
    Done,
}

/// Free-form metadata attached to a frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameMetadata {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: FrameStatus,
    #[serde(default)]
    pub comments: Vec<String>,
}

/// A rectangular container that clips the strokes drawn inside it.
///
/// `created_at` is the z-order key: when frames overlap, the most recently
/// created one is on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub(crate) id: FrameId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub name: String,
    #[serde(default)]
    pub style: FrameStyle,
    #[serde(default)]
    pub metadata: FrameMetadata,
    /// Creation time in ms since the UNIX epoch.
    pub created_at: u64,
    /// Last mutation time in ms since the UNIX epoch.
    pub updated_at: u64,
    /// Bumped on every mutation after creation.
    pub version: u64,
    /// Set while the frame is still being dragged out.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub creating: bool,
}

impl Frame {
    /// Create a finished frame.
    pub fn new(rect: Rect, name: impl Into<String>) -> Self {
        let rect = rect.abs();
        let now = now_millis();
        Self {
            id: Uuid::new_v4(),
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
            name: name.into(),
            style: FrameStyle::default(),
            metadata: FrameMetadata::default(),
            created_at: now,
            updated_at: now,
            version: 1,
            creating: false,
        }
    }

    /// Seed an in-progress frame at the drag start with zero size.
    pub fn begin(start: Point) -> Self {
        Self {
            version: 0,
            creating: true,
            ..Self::new(Rect::from_points(start, start), String::new())
        }
    }

    /// Get the frame bounds as a kurbo Rect.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Recompute the rectangle from a fixed corner and the current pointer.
    ///
    /// Width and height are always positive regardless of drag direction.
    pub fn resize_from_corners(&mut self, start: Point, current: Point) {
        self.x = start.x.min(current.x);
        self.y = start.y.min(current.y);
        self.width = (current.x - start.x).abs();
        self.height = (current.y - start.y).abs();
    }

    /// Check both dimensions against a minimum size.
    pub fn meets_min_size(&self, min_size: f64) -> bool {
        self.width >= min_size && self.height >= min_size
    }

    /// Turn an in-progress frame into a finished one.
    pub fn finalize(&mut self, name: impl Into<String>, created_at: u64) {
        self.creating = false;
        self.name = name.into();
        self.style = FrameStyle::default();
        self.metadata = FrameMetadata::default();
        self.created_at = created_at;
        self.updated_at = created_at;
        self.version = 1;
    }

    /// Closed-interval point containment.
    pub fn contains(&self, point: Point) -> bool {
        rect_contains_closed(self.rect(), point)
    }

    /// Flip a negative width or height into a positive one, keeping the
    /// covered area. Not a mutation: `version` is left alone.
    pub fn normalize(&mut self) {
        let rect = self.rect().abs();
        self.x = rect.x0;
        self.y = rect.y0;
        self.width = rect.width();
        self.height = rect.height();
    }

    /// Clamp each coordinate independently into the frame.
    ///
    /// A NaN edge leaves that coordinate unclipped.
    pub fn clamp_point(&self, point: Point) -> Point {
        let rect = self.rect().abs();
        Point::new(
            point.x.max(rect.x0).min(rect.x1),
            point.y.max(rect.y0).min(rect.y1),
        )
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_bounds(&mut self, rect: Rect) {
        let rect = rect.abs();
        self.x = rect.x0;
        self.y = rect.y0;
        self.width = rect.width();
        self.height = rect.height();
        self.touch();
    }

    pub fn set_style(&mut self, style: FrameStyle) {
        self.style = style;
        self.touch();
    }

    pub fn set_status(&mut self, status: FrameStatus) {
        self.metadata.status = status;
        self.touch();
    }

    /// Add a tag. Duplicate tags are ignored and do not count as a mutation.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.metadata.tags.contains(&tag) {
            self.metadata.tags.push(tag);
            self.touch();
        }
    }

    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.metadata.comments.push(comment.into());
        self.touch();
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = now_millis().max(self.updated_at);
    }
}

impl ShapeTrait for Frame {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        rect_contains_closed(self.rect().inflate(tolerance, tolerance), point)
    }
}
