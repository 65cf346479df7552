//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

/// Default lower zoom clamp.
pub const DEFAULT_MIN_ZOOM: f64 = 0.05;
/// Default upper zoom clamp.
pub const DEFAULT_MAX_ZOOM: f64 = 8.0;

/// An in-flight animated camera move.
#[derive(Debug, Clone)]
struct CameraTransition {
    from_offset: Vec2,
    from_zoom: f64,
    to_offset: Vec2,
    to_zoom: f64,
    start: Instant,
    duration: Duration,
}

impl CameraTransition {
    /// Linear progress in `[0, 1]`.
    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).min(1.0)
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Camera manages the view transform for the canvas.
///
/// It handles panning (translation) and zooming (scaling) operations,
/// converting between screen coordinates and canvas coordinates. Offset and
/// zoom are always updated together so that the anchor of a zoom stays put
/// on screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
    #[serde(skip)]
    transition: Option<CameraTransition>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            transition: None,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with custom zoom limits.
    ///
    /// Swapped limits are put back in order. A non-finite or non-positive
    /// limit falls back to its default.
    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        let min_zoom = if min_zoom.is_finite() && min_zoom > 0.0 {
            min_zoom
        } else {
            DEFAULT_MIN_ZOOM
        };
        let max_zoom = if max_zoom.is_finite() && max_zoom > 0.0 {
            max_zoom
        } else {
            DEFAULT_MAX_ZOOM
        };
        Self {
            min_zoom: min_zoom.min(max_zoom),
            max_zoom: min_zoom.max(max_zoom),
            ..Self::default()
        }
    }

    /// Clamp a zoom level into the camera's limits.
    ///
    /// Never panics, even if the public limits were set out of order.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts canvas coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling.
    ///
    /// This transform converts screen coordinates to canvas coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a canvas point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.settle();
        self.offset += delta;
    }

    /// Zoom the camera, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        self.settle();
        let new_zoom = self.clamp_zoom(self.zoom * factor);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        // Canvas point under the anchor before the zoom
        let world_point = self.screen_to_world(screen_point);

        self.zoom = new_zoom;

        // Shift so the same canvas point lands back under the anchor
        let new_screen = self.world_to_screen(world_point);
        self.offset += Vec2::new(
            screen_point.x - new_screen.x,
            screen_point.y - new_screen.y,
        );
    }

    /// Zoom in by one step around the viewport center.
    pub fn zoom_in(&mut self, viewport: Size, step: f64) {
        self.zoom_at(viewport_center(viewport), step);
    }

    /// Zoom out by one step around the viewport center.
    pub fn zoom_out(&mut self, viewport: Size, step: f64) {
        self.zoom_at(viewport_center(viewport), 1.0 / step);
    }

    /// Reset camera to the origin at 100% immediately.
    pub fn reset(&mut self) {
        self.transition = None;
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Start an animated return to the origin at 100%.
    ///
    /// The camera reaches its target once [`Camera::tick`] is called at or
    /// after `now + duration`.
    pub fn animate_reset(&mut self, now: Instant, duration: Duration) {
        self.settle();
        if duration.is_zero() {
            self.reset();
            return;
        }
        self.transition = Some(CameraTransition {
            from_offset: self.offset,
            from_zoom: self.zoom,
            to_offset: Vec2::ZERO,
            to_zoom: self.clamp_zoom(1.0),
            start: now,
            duration,
        });
    }

    /// Advance a running animation. Returns true if the camera moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(transition) = &self.transition else {
            return false;
        };
        let t = transition.progress(now);
        if t >= 1.0 {
            self.settle();
            return true;
        }
        let eased = ease_out_cubic(t);
        self.zoom = transition.from_zoom + (transition.to_zoom - transition.from_zoom) * eased;
        self.offset = transition.from_offset + (transition.to_offset - transition.from_offset) * eased;
        true
    }

    /// Check whether an animation is in flight.
    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Jump a running animation to its target.
    pub fn settle(&mut self) {
        if let Some(transition) = self.transition.take() {
            self.offset = transition.to_offset;
            self.zoom = transition.to_zoom;
        }
    }

    /// Fit the camera to show the given bounding box.
    ///
    /// The resulting zoom never exceeds `max_fit_zoom`, so small content is
    /// not blown up past that factor.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64, max_fit_zoom: f64) {
        self.settle();
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let padded_viewport = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded_viewport.width / bounds.width();
        let scale_y = padded_viewport.height / bounds.height();
        self.zoom = self.clamp_zoom(scale_x.min(scale_y).min(max_fit_zoom));

        // Center the bounds in the viewport
        let bounds_center = bounds.center();
        let viewport_center = viewport_center(viewport);

        self.offset = Vec2::new(
            viewport_center.x - bounds_center.x * self.zoom,
            viewport_center.y - bounds_center.y * self.zoom,
        );
    }
}

fn viewport_center(viewport: Size) -> Point {
    Point::new(viewport.width / 2.0, viewport.height / 2.0)
}
