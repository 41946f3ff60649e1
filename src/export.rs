//! Export support: content bounds and the temporary export viewport.
//!
//! The actual snapshot/PDF pipeline lives in the host. It only needs two
//! things from the engine: the world-space bounding box of everything on
//! the board, and a camera that frames it at zoom 1. The host installs the
//! returned camera, renders once at the returned size, and restores the
//! previous camera afterwards.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use crate::camera::Camera;
use crate::consts::{EXPORT_FALLBACK_HEIGHT, EXPORT_FALLBACK_WIDTH, EXPORT_PADDING};
use crate::doc::{Document, Shape};

/// World-space axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl WorldBounds {
    fn include_point(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn include_box(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.include_point(x, y);
        self.include_point(x + w, y + h);
    }
}

/// The viewport the exporter temporarily installs: zoom 1, panned so all
/// content starts at the canvas origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportView {
    pub camera: Camera,
    pub width: f64,
    pub height: f64,
}

/// Bounding box over every element and widget, or `None` for an empty board.
///
/// Strokes contribute each vertex; boxes contribute their full extent;
/// widgets contribute their anchor plus stored size (a widget without a
/// stored size counts as a point).
#[must_use]
pub fn content_bounds(doc: &Document) -> Option<WorldBounds> {
    let mut bounds = WorldBounds {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };
    let mut any = false;

    for el in doc.elements() {
        any = true;
        match &el.shape {
            Shape::Stroke { pts } => {
                for p in pts {
                    bounds.include_point(p.x, p.y);
                }
            }
            Shape::Rect { x, y, w, h } | Shape::Circle { x, y, w, h } => {
                bounds.include_box(*x, *y, *w, *h);
            }
        }
    }

    for n in doc.notes() {
        any = true;
        bounds.include_box(n.x, n.y, n.w.unwrap_or(0.0), n.h.unwrap_or(0.0));
    }
    for t in doc.texts() {
        any = true;
        bounds.include_box(t.x, t.y, t.w.unwrap_or(0.0), t.h.unwrap_or(0.0));
    }
    for i in doc.images() {
        any = true;
        bounds.include_box(i.x, i.y, i.w.unwrap_or(0.0), i.h.unwrap_or(0.0));
    }

    any.then_some(bounds)
}

/// Build the export viewport from content bounds, padded on every side.
/// An empty board exports a default-extent frame around the origin.
#[must_use]
pub fn export_view(bounds: Option<WorldBounds>) -> ExportView {
    let mut b = bounds.unwrap_or(WorldBounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: EXPORT_FALLBACK_WIDTH,
        max_y: EXPORT_FALLBACK_HEIGHT,
    });
    b.min_x -= EXPORT_PADDING;
    b.min_y -= EXPORT_PADDING;
    b.max_x += EXPORT_PADDING;
    b.max_y += EXPORT_PADDING;

    ExportView {
        camera: Camera { pan_x: -b.min_x, pan_y: -b.min_y, zoom: 1.0 },
        width: b.max_x - b.min_x,
        height: b.max_y - b.min_y,
    }
}
