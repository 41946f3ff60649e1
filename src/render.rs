//! Rendering: walks the scene and drives a 2D drawing surface.
//!
//! This module receives read-only views of document and camera state and
//! produces drawing commands — it mutates no application state. The actual
//! pixel target sits behind [`Surface`]; the `web` feature binds it to a
//! browser canvas context, and tests record the command stream.
//!
//! Draw order is the visual contract: committed elements in insertion order
//! (later elements paint over earlier ones, there is no z-index beyond the
//! list), then the in-progress pending shape in the *currently selected*
//! style rather than any stored one. Overlay widgets are not drawn here;
//! the engine repositions them through the presenter after every draw.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Camera, Point};
use crate::doc::{Document, Shape};
use crate::input::ToolStyle;

/// A 2D drawing surface with the operations the scene needs.
///
/// Implementations are expected to stroke with round caps and joins.
pub trait Surface {
    /// Reset the transform and clear the full viewport (CSS pixels).
    fn begin_frame(&mut self, width: f64, height: f64);
    /// Install the world transform: translate by pan, then scale by zoom.
    fn apply_camera(&mut self, camera: &Camera);
    /// Set stroke color and line width for subsequent operations.
    fn set_stroke_style(&mut self, color: &str, line_width: f64);
    /// Stroke a polyline through world-space points.
    fn polyline(&mut self, pts: &[Point]);
    /// Stroke an axis-aligned rectangle outline.
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    /// Stroke a full circle outline.
    fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64);
}

/// The shape being dragged out right now, not yet committed.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview<'a> {
    /// Freehand stroke through the accumulated points.
    Stroke(&'a [Point]),
    /// Rectangle spanned between the anchor and the current point.
    Rect { from: Point, to: Point },
    /// Circle over the box spanned between the anchor and the current point.
    Circle { from: Point, to: Point },
}

/// Draw the full scene: committed elements, then the pending preview.
pub fn draw(
    surface: &mut dyn Surface,
    doc: &Document,
    camera: &Camera,
    preview: Option<&Preview<'_>>,
    style: &ToolStyle,
    viewport_w: f64,
    viewport_h: f64,
) {
    // Layer 1: clear and set up the world transform.
    surface.begin_frame(viewport_w, viewport_h);
    surface.apply_camera(camera);

    // Layer 2: committed elements in insertion order.
    for el in doc.elements() {
        surface.set_stroke_style(&el.col, el.lw);
        draw_shape(surface, &el.shape);
    }

    // Layer 3: the pending shape, in the live style.
    if let Some(preview) = preview {
        surface.set_stroke_style(&style.color, style.line_width);
        draw_preview(surface, preview);
    }
}

fn draw_shape(surface: &mut dyn Surface, shape: &Shape) {
    match shape {
        Shape::Stroke { pts } => draw_stroke(surface, pts),
        Shape::Rect { x, y, w, h } => surface.stroke_rect(*x, *y, *w, *h),
        Shape::Circle { x, y, w, h } => {
            surface.stroke_circle(x + w / 2.0, y + h / 2.0, w.hypot(*h) / 2.0);
        }
    }
}

fn draw_stroke(surface: &mut dyn Surface, pts: &[Point]) {
    match pts {
        [] => {}
        // A single point still marks the canvas: round caps turn a
        // zero-length segment into a dot.
        [p] => surface.polyline(&[*p, *p]),
        _ => surface.polyline(pts),
    }
}

fn draw_preview(surface: &mut dyn Surface, preview: &Preview<'_>) {
    match preview {
        Preview::Stroke(pts) => draw_stroke(surface, pts),
        Preview::Rect { from, to } => {
            let (x, y, w, h) = span(*from, *to);
            surface.stroke_rect(x, y, w, h);
        }
        Preview::Circle { from, to } => {
            let (x, y, w, h) = span(*from, *to);
            surface.stroke_circle(x + w / 2.0, y + h / 2.0, w.hypot(h) / 2.0);
        }
    }
}

/// Normalize two drag corners into a top-left + size box (`w, h >= 0`).
#[must_use]
pub fn span(from: Point, to: Point) -> (f64, f64, f64, f64) {
    let w = (to.x - from.x).abs();
    let h = (to.y - from.y).abs();
    let x = to.x.min(from.x);
    let y = to.y.min(from.y);
    (x, y, w, h)
}
