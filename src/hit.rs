//! Eraser hit-testing against committed vector elements.
//!
//! The eraser walks elements from most-recently-added to oldest so the
//! visually topmost element is removed first; the first match wins and at
//! most one element is reported per call.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::consts::STROKE_HIT_TOLERANCE;
use crate::doc::{Element, Shape};

/// Find the topmost element under `world`, if any.
///
/// Hit rules per variant: rectangles match a point inside their axis-aligned
/// bounds; circles match within half the bounding-box diagonal of the box
/// center (the same radius they are drawn with); strokes match within
/// [`STROKE_HIT_TOLERANCE`] world units of any vertex.
#[must_use]
pub fn hit_test<'a>(elements: &'a [Element], world: Point) -> Option<&'a str> {
    elements
        .iter()
        .rev()
        .find(|el| shape_contains(&el.shape, world))
        .map(|el| el.id.as_str())
}

fn shape_contains(shape: &Shape, p: Point) -> bool {
    match shape {
        Shape::Rect { x, y, w, h } => p.x >= *x && p.x <= x + w && p.y >= *y && p.y <= y + h,
        Shape::Circle { x, y, w, h } => {
            let cx = x + w / 2.0;
            let cy = y + h / 2.0;
            let radius = w.hypot(*h) / 2.0;
            (p.x - cx).hypot(p.y - cy) <= radius
        }
        Shape::Stroke { pts } => pts
            .iter()
            .any(|v| (p.x - v.x).hypot(p.y - v.y) <= STROKE_HIT_TOLERANCE),
    }
}
