//! Pan/zoom camera for the infinite board and screen↔world conversions.
//!
//! Every conversion is the same affine map on each axis:
//! `screen = world * zoom + pan`. Pan is in CSS pixels, so panning drag
//! deltas are added unscaled; zoom is clamped to [`ZOOM_MIN`, `ZOOM_MAX`]
//! and can never reach zero.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Camera state for pan/zoom on the infinite canvas.
///
/// `pan_x` / `pan_y` are in CSS pixels. `zoom` is a scale factor
/// (1.0 = no zoom), always within [`ZOOM_MIN`, `ZOOM_MAX`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan_x,
            y: world.y * self.zoom + self.pan_y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Translate the viewport by screen-pixel deltas.
    ///
    /// Drag deltas arrive in screen pixels already, so they are added to
    /// the pan unscaled.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Rescale zoom by `factor` while keeping the world point under
    /// `anchor` (a screen point) visually fixed.
    ///
    /// The anchor stays put by solving `pan' = anchor - (anchor - pan) *
    /// (zoom'/zoom)` independently per axis. The factor is applied to the
    /// current zoom and the result clamped to [`ZOOM_MIN`, `ZOOM_MAX`];
    /// the pan correction uses the clamped value.
    pub fn zoom_around(&mut self, anchor: Point, factor: f64) {
        let old_zoom = self.zoom;
        self.zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        let ratio = self.zoom / old_zoom;
        self.pan_x = anchor.x - (anchor.x - self.pan_x) * ratio;
        self.pan_y = anchor.y - (anchor.y - self.pan_y) * ratio;
    }

    /// One zoom-in step (wheel notch or button press) anchored at `anchor`.
    pub fn zoom_in(&mut self, anchor: Point) {
        self.zoom_around(anchor, ZOOM_STEP);
    }

    /// One zoom-out step anchored at `anchor`.
    pub fn zoom_out(&mut self, anchor: Point) {
        self.zoom_around(anchor, 1.0 / ZOOM_STEP);
    }
}
