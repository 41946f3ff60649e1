//! Document model: board content and its in-memory store.
//!
//! This module defines the vector elements drawn into the canvas layer
//! (`Element`, `Shape`), the anchored overlay widgets (`Note`, `TextBox`,
//! `ImageBox`), and the `Document` container that owns all of them for one
//! session. The structs double as the wire shapes of the external store
//! contract, so field names follow the persisted form (`col`, `lw`, `pts`,
//! `bg`, `txt`, `src`).
//!
//! Data flows into this layer from the sync engine (snapshot application)
//! and from the edit controller (local mutations). Mutations are synchronous
//! and touch nothing outside the document; rendering and persistence are
//! triggered by the caller.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::camera::Point;

fn default_line_width() -> f64 {
    2.0
}

/// A committed vector element as stored in the document and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier, unique across the whole document.
    pub id: String,
    /// Stroke color as a CSS color string.
    #[serde(default)]
    pub col: String,
    /// Line width in world units.
    #[serde(default = "default_line_width")]
    pub lw: f64,
    /// Session that created the element; stamped `"anon"` at save when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// The geometry variant, tagged `t` on the wire.
    #[serde(flatten)]
    pub shape: Shape,
}

/// Element geometry. Strokes are append-only while pending and immutable
/// once committed; boxes are normalized so `w, h >= 0` at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Shape {
    /// Freehand polyline through world-space points (at least one).
    #[serde(rename = "p")]
    Stroke { pts: Vec<Point> },
    /// Axis-aligned rectangle, top-left plus size.
    #[serde(rename = "r")]
    Rect { x: f64, y: f64, w: f64, h: f64 },
    /// Circle drawn from a bounding box. The rendered radius is half the
    /// box diagonal, not half the width or height, so unequal drags still
    /// produce a circle rather than an ellipse.
    #[serde(rename = "c")]
    Circle { x: f64, y: f64, w: f64, h: f64 },
}

/// Which overlay widget category an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Note,
    Text,
    Image,
}

/// A sticky note: positioned text surface with a background color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    /// World-space anchor (top-left).
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    #[serde(default)]
    pub txt: String,
}

/// A single-line text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default)]
    pub txt: String,
}

/// An image widget. `src` is an opaque image reference (data URL or http).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBox {
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default)]
    pub src: String,
}

/// In-memory store of all board content for one session.
///
/// Elements keep insertion order (later elements paint over earlier ones);
/// widgets keep per-category insertion order and are looked up by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    elements: Vec<Element>,
    notes: Vec<Note>,
    texts: Vec<TextBox>,
    images: Vec<ImageBox>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Elements ---

    /// Committed vector elements in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Append a committed element. A duplicate id anywhere in the document
    /// is rejected rather than shadowed.
    pub fn add_element(&mut self, element: Element) {
        if self.contains_id(&element.id) {
            warn!(id = %element.id, "duplicate element id rejected");
            return;
        }
        self.elements.push(element);
    }

    /// Remove an element by id, returning it if it was present.
    pub fn remove_element(&mut self, id: &str) -> Option<Element> {
        let idx = self.elements.iter().position(|e| e.id == id)?;
        Some(self.elements.remove(idx))
    }

    /// Replace the whole element list with a snapshot's list. Elements have
    /// no in-place editable fields, so wholesale replacement is safe.
    pub fn replace_elements(&mut self, elements: Vec<Element>) {
        self.elements = elements;
    }

    // --- Widgets ---

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn texts(&self) -> &[TextBox] {
        &self.texts
    }

    #[must_use]
    pub fn images(&self) -> &[ImageBox] {
        &self.images
    }

    #[must_use]
    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    #[must_use]
    pub fn text(&self, id: &str) -> Option<&TextBox> {
        self.texts.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn image(&self, id: &str) -> Option<&ImageBox> {
        self.images.iter().find(|i| i.id == id)
    }

    /// Insert a note or merge fields into an existing one.
    ///
    /// Position and text always overwrite (the caller resolves the
    /// focused-widget text rule before calling); size and background only
    /// overwrite when the incoming value is present.
    pub fn upsert_note(&mut self, incoming: Note) {
        if let Some(existing) = self.notes.iter_mut().find(|n| n.id == incoming.id) {
            existing.x = incoming.x;
            existing.y = incoming.y;
            if incoming.w.is_some() {
                existing.w = incoming.w;
            }
            if incoming.h.is_some() {
                existing.h = incoming.h;
            }
            if incoming.bg.is_some() {
                existing.bg = incoming.bg;
            }
            existing.txt = incoming.txt;
        } else {
            if self.contains_id(&incoming.id) {
                warn!(id = %incoming.id, "duplicate widget id rejected");
                return;
            }
            self.notes.push(incoming);
        }
    }

    /// Insert a text box or merge fields into an existing one. Same merge
    /// rules as [`Document::upsert_note`].
    pub fn upsert_text(&mut self, incoming: TextBox) {
        if let Some(existing) = self.texts.iter_mut().find(|t| t.id == incoming.id) {
            existing.x = incoming.x;
            existing.y = incoming.y;
            if incoming.w.is_some() {
                existing.w = incoming.w;
            }
            if incoming.h.is_some() {
                existing.h = incoming.h;
            }
            existing.txt = incoming.txt;
        } else {
            if self.contains_id(&incoming.id) {
                warn!(id = %incoming.id, "duplicate widget id rejected");
                return;
            }
            self.texts.push(incoming);
        }
    }

    /// Insert an image widget or merge position/size into an existing one.
    /// The image source is fixed at creation and never merged afterwards.
    pub fn upsert_image(&mut self, incoming: ImageBox) {
        if let Some(existing) = self.images.iter_mut().find(|i| i.id == incoming.id) {
            existing.x = incoming.x;
            existing.y = incoming.y;
            if incoming.w.is_some() {
                existing.w = incoming.w;
            }
            if incoming.h.is_some() {
                existing.h = incoming.h;
            }
        } else {
            if self.contains_id(&incoming.id) {
                warn!(id = %incoming.id, "duplicate widget id rejected");
                return;
            }
            self.images.push(incoming);
        }
    }

    /// Remove a widget by id from whichever category holds it.
    pub fn remove_widget(&mut self, id: &str) -> Option<WidgetKind> {
        if let Some(idx) = self.notes.iter().position(|n| n.id == id) {
            self.notes.remove(idx);
            return Some(WidgetKind::Note);
        }
        if let Some(idx) = self.texts.iter().position(|t| t.id == id) {
            self.texts.remove(idx);
            return Some(WidgetKind::Text);
        }
        if let Some(idx) = self.images.iter().position(|i| i.id == id) {
            self.images.remove(idx);
            return Some(WidgetKind::Image);
        }
        None
    }

    /// Remove every widget of one category, returning the removed ids.
    pub fn remove_widgets_of(&mut self, kind: WidgetKind) -> Vec<String> {
        match kind {
            WidgetKind::Note => self.notes.drain(..).map(|n| n.id).collect(),
            WidgetKind::Text => self.texts.drain(..).map(|t| t.id).collect(),
            WidgetKind::Image => self.images.drain(..).map(|i| i.id).collect(),
        }
    }

    /// Which category an id currently belongs to, if any.
    #[must_use]
    pub fn widget_kind(&self, id: &str) -> Option<WidgetKind> {
        if self.notes.iter().any(|n| n.id == id) {
            Some(WidgetKind::Note)
        } else if self.texts.iter().any(|t| t.id == id) {
            Some(WidgetKind::Text)
        } else if self.images.iter().any(|i| i.id == id) {
            Some(WidgetKind::Image)
        } else {
            None
        }
    }

    /// Translate a widget by a world-space delta. Returns false if the id
    /// is unknown.
    pub fn translate_widget(&mut self, id: &str, dx: f64, dy: f64) -> bool {
        if let Some(n) = self.notes.iter_mut().find(|n| n.id == id) {
            n.x += dx;
            n.y += dy;
            return true;
        }
        if let Some(t) = self.texts.iter_mut().find(|t| t.id == id) {
            t.x += dx;
            t.y += dy;
            return true;
        }
        if let Some(i) = self.images.iter_mut().find(|i| i.id == id) {
            i.x += dx;
            i.y += dy;
            return true;
        }
        false
    }

    /// Record a widget's on-screen size after a host resize gesture.
    pub fn set_widget_size(&mut self, id: &str, w: f64, h: f64) -> bool {
        if let Some(n) = self.notes.iter_mut().find(|n| n.id == id) {
            n.w = Some(w);
            n.h = Some(h);
            return true;
        }
        if let Some(t) = self.texts.iter_mut().find(|t| t.id == id) {
            t.w = Some(w);
            t.h = Some(h);
            return true;
        }
        if let Some(i) = self.images.iter_mut().find(|i| i.id == id) {
            i.w = Some(w);
            i.h = Some(h);
            return true;
        }
        false
    }

    /// Update the live text of a note or text box. Images have no text.
    pub fn set_widget_text(&mut self, id: &str, text: &str) -> bool {
        if let Some(n) = self.notes.iter_mut().find(|n| n.id == id) {
            text.clone_into(&mut n.txt);
            return true;
        }
        if let Some(t) = self.texts.iter_mut().find(|t| t.id == id) {
            text.clone_into(&mut t.txt);
            return true;
        }
        false
    }

    /// World-space anchor of a widget, if present.
    #[must_use]
    pub fn widget_position(&self, id: &str) -> Option<Point> {
        if let Some(n) = self.note(id) {
            return Some(Point::new(n.x, n.y));
        }
        if let Some(t) = self.text(id) {
            return Some(Point::new(t.x, t.y));
        }
        if let Some(i) = self.image(id) {
            return Some(Point::new(i.x, i.y));
        }
        None
    }

    // --- Whole document ---

    /// True if `id` is taken by any element or widget.
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.elements.iter().any(|e| e.id == id)
            || self.notes.iter().any(|n| n.id == id)
            || self.texts.iter().any(|t| t.id == id)
            || self.images.iter().any(|i| i.id == id)
    }

    /// Drop all content.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.notes.clear();
        self.texts.clear();
        self.images.clear();
    }

    /// True when the document holds no elements and no widgets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.notes.is_empty() && self.texts.is_empty() && self.images.is_empty()
    }
}
