//! Text elements owned by the host, mirrored for hit-testing.

use super::{ShapeId, ShapeTrait, rect_contains_closed};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Bounds of a text element the host created.
///
/// The engine never creates or edits text; it only needs to know where text
/// sits so that a text-tool click on it selects instead of creating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub id: ShapeId,
    pub rect: Rect,
}

impl TextBox {
    pub fn new(id: ShapeId, rect: Rect) -> Self {
        Self { id, rect }
    }
}

impl ShapeTrait for TextBox {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.rect
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        rect_contains_closed(self.rect.inflate(tolerance, tolerance), point)
    }
}
