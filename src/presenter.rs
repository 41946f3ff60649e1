//! Widget presenter: owns the on-screen overlay widget set.
//!
//! Notes, text boxes, and images are not canvas pixels — they are live
//! interactive surfaces overlaid on the board and repositioned on every
//! pan/zoom/resize. The presenter is the single source of truth for "does
//! this widget currently exist on screen" and "which widget holds input
//! focus"; nothing else queries the display. All actual surface work is
//! delegated to the host through [`WidgetHost`] commands.

#[cfg(test)]
#[path = "presenter_test.rs"]
mod presenter_test;

use std::collections::{HashMap, HashSet};

use crate::camera::Camera;
use crate::doc::{Document, ImageBox, Note, TextBox, WidgetKind};

/// Commands the presenter issues to the host's widget layer.
///
/// The host maps these onto whatever it renders widgets with (DOM nodes in
/// a browser). It must not mutate widget state on its own; user edits flow
/// back through the engine's widget event methods instead.
pub trait WidgetHost {
    /// Create the on-screen surface for a widget.
    fn materialize(&mut self, kind: WidgetKind, id: &str);
    /// Move a widget's top-left to a screen-space position.
    fn set_screen_position(&mut self, id: &str, x: f64, y: f64);
    /// Apply a stored size, in CSS pixels.
    fn set_size(&mut self, id: &str, w: f64, h: f64);
    /// Apply a note's background color.
    fn set_background(&mut self, id: &str, bg: &str);
    /// Overwrite the editable text value.
    fn set_text(&mut self, id: &str, text: &str);
    /// Set an image widget's source. Issued only at materialization.
    fn set_image_source(&mut self, id: &str, src: &str);
    /// Tear down the on-screen surface.
    fn remove(&mut self, id: &str);
    /// Give a widget's input element keyboard focus.
    fn focus(&mut self, id: &str);
}

/// Registry of live widget surfaces plus the focus owner.
pub struct Presenter {
    host: Box<dyn WidgetHost>,
    live: HashMap<String, WidgetKind>,
    focused: Option<String>,
}

impl Presenter {
    #[must_use]
    pub fn new(host: Box<dyn WidgetHost>) -> Self {
        Self { host, live: HashMap::new(), focused: None }
    }

    /// Whether a widget surface currently exists on screen.
    #[must_use]
    pub fn exists(&self, id: &str) -> bool {
        self.live.contains_key(id)
    }

    /// Ids of live widgets of one category.
    #[must_use]
    pub fn ids_of(&self, kind: WidgetKind) -> Vec<String> {
        self.live
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// The widget currently holding input focus, if any.
    #[must_use]
    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    #[must_use]
    pub fn is_focused(&self, id: &str) -> bool {
        self.focused.as_deref() == Some(id)
    }

    /// Record a focus change reported by the host (`None` on blur).
    pub fn set_focus(&mut self, id: Option<String>) {
        self.focused = id;
    }

    /// Focus a widget: issues the host command and records the new owner
    /// without waiting for the host's focus event to round-trip.
    pub fn focus_widget(&mut self, id: &str) {
        self.host.focus(id);
        self.focused = Some(id.to_owned());
    }

    // --- Reconciliation ---

    /// Bring a note surface in line with its document record, creating it
    /// if absent. Text is pushed only when `overwrite_text` (the engine
    /// resolves the focused-widget rule before calling).
    pub fn apply_note(&mut self, note: &Note, overwrite_text: bool) {
        self.ensure(WidgetKind::Note, &note.id);
        if let Some(bg) = &note.bg {
            self.host.set_background(&note.id, bg);
        }
        if let (Some(w), Some(h)) = (note.w, note.h) {
            self.host.set_size(&note.id, w, h);
        }
        if overwrite_text {
            self.host.set_text(&note.id, &note.txt);
        }
    }

    /// Bring a text-box surface in line with its document record.
    pub fn apply_text(&mut self, text: &TextBox, overwrite_text: bool) {
        self.ensure(WidgetKind::Text, &text.id);
        if let (Some(w), Some(h)) = (text.w, text.h) {
            self.host.set_size(&text.id, w, h);
        }
        if overwrite_text {
            self.host.set_text(&text.id, &text.txt);
        }
    }

    /// Bring an image surface in line with its document record. The source
    /// is only ever pushed when the surface is first created.
    pub fn apply_image(&mut self, image: &ImageBox) {
        let created = self.ensure(WidgetKind::Image, &image.id);
        if created {
            self.host.set_image_source(&image.id, &image.src);
        }
        if let (Some(w), Some(h)) = (image.w, image.h) {
            self.host.set_size(&image.id, w, h);
        }
    }

    /// Tear down one widget surface. Clears focus if it held it.
    pub fn remove_widget(&mut self, id: &str) {
        if self.live.remove(id).is_some() {
            self.host.remove(id);
        }
        if self.is_focused(id) {
            self.focused = None;
        }
    }

    /// Tear down every live widget whose id is not in `keep` (remote
    /// deletions). Returns the removed ids.
    pub fn remove_absent(&mut self, keep: &HashSet<String>) -> Vec<String> {
        let doomed: Vec<String> = self
            .live
            .keys()
            .filter(|id| !keep.contains(*id))
            .cloned()
            .collect();
        for id in &doomed {
            self.remove_widget(id);
        }
        doomed
    }

    // --- Positioning ---

    /// Recompute one widget's screen position from the camera transform.
    pub fn reposition(&mut self, doc: &Document, camera: &Camera, id: &str) {
        if !self.live.contains_key(id) {
            return;
        }
        if let Some(world) = doc.widget_position(id) {
            let screen = camera.world_to_screen(world);
            self.host.set_screen_position(id, screen.x, screen.y);
        }
    }

    /// Recompute every live widget's screen position. Called on each render
    /// so widgets track pan/zoom/resize.
    pub fn reposition_all(&mut self, doc: &Document, camera: &Camera) {
        let ids: Vec<String> = self.live.keys().cloned().collect();
        for id in ids {
            self.reposition(doc, camera, &id);
        }
    }

    /// Materialize the surface if absent. Returns whether it was created.
    fn ensure(&mut self, kind: WidgetKind, id: &str) -> bool {
        if self.live.contains_key(id) {
            return false;
        }
        self.host.materialize(kind, id);
        self.live.insert(id.to_owned(), kind);
        true
    }
}
