//! Session engine: local edit controller and sync orchestration.
//!
//! One `Engine` is one board session. It owns the document, the camera,
//! the widget presenter, the undo history, and the sync state — there are
//! no ambient globals, so a process can run several boards side by side
//! (tests do). The host wires pointer/key/widget events into the engine,
//! pumps the save debounce with its clock, renders when the engine says
//! so, and forwards store change notifications to [`Engine::apply_remote`].
//!
//! DESIGN
//! ======
//! Data flow: input → edit controller → document → render flag (immediate)
//! and save debounce (outbound). Remote snapshot → [`Engine::apply_remote`]
//! → document + presenter reconciliation → render flag. Everything runs on
//! one thread; the only suspensions are the store reads/writes.
//!
//! ERROR HANDLING
//! ==============
//! A failed initial load is fatal to the session and surfaces as the
//! `Error` status. A failed save keeps the in-memory document as the
//! source of truth; the next edit re-arms the debounce and retries a full
//! whole-document write, which is naturally idempotent.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::camera::{Camera, Point};
use crate::consts::MIN_SHAPE_EXTENT;
use crate::doc::{Document, Element, ImageBox, Note, Shape, TextBox, WidgetKind};
use crate::hit;
use crate::input::{Button, Gesture, Key, Tool, ToolStyle};
use crate::presenter::{Presenter, WidgetHost};
use crate::render::{self, Preview, Surface};
use crate::store::{Content, RoomId, Store};
use crate::sync::{self, SyncConfig, SyncError, SyncState, SyncStatus};

/// A creation made by this session, for local undo. The stack is neither
/// shared nor persisted and knows nothing about other sessions' edits.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    pub id: String,
}

/// Which layer a history entry referred to when it was pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    Element,
    Widget,
}

/// Host-supplied monotonic clock in milliseconds (`performance.now()` in a
/// browser). The engine never reads wall-clock time on its own.
pub type Clock = Box<dyn Fn() -> f64>;

/// One board session.
pub struct Engine {
    doc: Document,
    camera: Camera,
    tool: Tool,
    style: ToolStyle,
    gesture: Gesture,
    history: Vec<HistoryEntry>,
    presenter: Presenter,
    sync: SyncState,
    store: Option<Rc<dyn Store>>,
    room: Option<RoomId>,
    session_id: String,
    clock: Clock,
    viewport_w: f64,
    viewport_h: f64,
    pan_key_held: bool,
    needs_render: bool,
}

impl Engine {
    #[must_use]
    pub fn new(host: Box<dyn WidgetHost>, clock: Clock, config: SyncConfig) -> Self {
        Self {
            doc: Document::new(),
            camera: Camera::default(),
            tool: Tool::default(),
            style: ToolStyle::default(),
            gesture: Gesture::Idle,
            history: Vec::new(),
            presenter: Presenter::new(host),
            sync: SyncState::new(config),
            store: None,
            room: None,
            session_id: Uuid::new_v4().to_string(),
            clock,
            viewport_w: 0.0,
            viewport_h: 0.0,
            pan_key_held: false,
            needs_render: false,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Install a camera wholesale. The exporter uses this to temporarily
    /// force a zoom-1 bounding viewport and restore the original after.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.needs_render = true;
    }

    #[must_use]
    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.sync.status()
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Whether the scene changed since the last [`Engine::render`] call.
    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    // --- Host configuration ---

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn set_stroke_color(&mut self, color: &str) {
        color.clone_into(&mut self.style.color);
    }

    pub fn set_line_width(&mut self, line_width: f64) {
        self.style.line_width = line_width;
    }

    /// Update viewport dimensions (CSS pixels) after a canvas resize.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_w = width;
        self.viewport_h = height;
        self.needs_render = true;
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button) {
        if button == Button::Middle || self.pan_key_held || self.tool.pans() {
            self.gesture = Gesture::Panning { last_screen: screen };
            return;
        }

        let world = self.camera.screen_to_world(screen);
        match self.tool {
            Tool::Note => {
                self.create_note_at(world);
                self.tool = Tool::Select;
            }
            Tool::Text => {
                self.create_text_at(world);
                self.tool = Tool::Select;
            }
            Tool::Erase => {
                self.erase_at(world);
                self.gesture = Gesture::Erasing;
            }
            _ => {
                self.gesture = Gesture::Drawing { points: vec![world] };
            }
        }
    }

    pub fn on_pointer_move(&mut self, screen: Point) {
        match &mut self.gesture {
            Gesture::Panning { last_screen } => {
                self.camera.pan_by(screen.x - last_screen.x, screen.y - last_screen.y);
                *last_screen = screen;
                self.needs_render = true;
                return;
            }
            Gesture::Drawing { points } => {
                points.push(self.camera.screen_to_world(screen));
                self.needs_render = true;
                return;
            }
            Gesture::Idle => return,
            Gesture::Erasing => {}
        }
        // Erase drag: at most one element removed per move event.
        let world = self.camera.screen_to_world(screen);
        self.erase_at(world);
    }

    pub fn on_pointer_up(&mut self, screen: Point) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Panning { .. } | Gesture::Erasing => {}
            Gesture::Drawing { points } => {
                self.commit_pending(points, screen);
                self.needs_render = true;
            }
        }
    }

    /// Wheel scroll zooms one step, anchored at the cursor.
    pub fn on_wheel(&mut self, screen: Point, delta_y: f64) {
        if delta_y < 0.0 {
            self.camera.zoom_in(screen);
        } else {
            self.camera.zoom_out(screen);
        }
        self.needs_render = true;
    }

    /// Zoom-button steps are anchored at the canvas center.
    pub fn zoom_in_step(&mut self) {
        let center = Point::new(self.viewport_w / 2.0, self.viewport_h / 2.0);
        self.camera.zoom_in(center);
        self.needs_render = true;
    }

    pub fn zoom_out_step(&mut self) {
        let center = Point::new(self.viewport_w / 2.0, self.viewport_h / 2.0);
        self.camera.zoom_out(center);
        self.needs_render = true;
    }

    // --- Keyboard input ---

    /// Space holds the pan modifier, unless a widget is being typed into.
    pub fn on_key_down(&mut self, key: &Key) {
        if key.0 == "Space" && self.presenter.focused().is_none() {
            self.pan_key_held = true;
        }
    }

    pub fn on_key_up(&mut self, key: &Key) {
        if key.0 == "Space" {
            self.pan_key_held = false;
        }
    }

    // --- Local edits ---

    /// Undo the most recent creation made by this session.
    ///
    /// Presence decides the path: an entry whose widget is still on screen
    /// removes that widget; otherwise the matching element is removed. An
    /// entry is consumed either way — undo cannot touch another session's
    /// edits.
    pub fn undo(&mut self) {
        let Some(entry) = self.history.pop() else {
            return;
        };
        if self.presenter.exists(&entry.id) {
            self.doc.remove_widget(&entry.id);
            self.presenter.remove_widget(&entry.id);
            self.request_save();
            return;
        }
        if self.doc.remove_element(&entry.id).is_some() {
            self.needs_render = true;
            self.request_save();
        }
    }

    /// Wipe the board: all vector elements plus note and text widgets.
    /// Image widgets survive a wipe.
    pub fn clear_board(&mut self) {
        self.doc.replace_elements(Vec::new());
        for kind in [WidgetKind::Note, WidgetKind::Text] {
            for id in self.doc.remove_widgets_of(kind) {
                self.presenter.remove_widget(&id);
            }
        }
        self.needs_render = true;
        self.request_save();
    }

    /// Place an image widget (the host ingests file/clipboard data and
    /// hands over an opaque source reference).
    pub fn create_image_at(&mut self, world: Point, src: &str) {
        let id = new_id();
        let image = ImageBox {
            id: id.clone(),
            x: world.x,
            y: world.y,
            w: None,
            h: None,
            src: src.to_owned(),
        };
        self.presenter.apply_image(&image);
        self.doc.upsert_image(image);
        self.presenter.reposition(&self.doc, &self.camera, &id);
        self.history.push(HistoryEntry { kind: HistoryKind::Widget, id });
        self.request_save();
    }

    // --- Widget events forwarded by the host ---

    /// Pointer-down on a widget's drag handle. Returns true when the
    /// eraser consumed the event by deleting the widget; otherwise the
    /// host proceeds with its own drag handling.
    pub fn widget_pointer_down(&mut self, id: &str) -> bool {
        if self.tool == Tool::Erase {
            self.delete_widget(id);
            return true;
        }
        false
    }

    /// Delete one widget (close button or eraser).
    pub fn delete_widget(&mut self, id: &str) {
        self.doc.remove_widget(id);
        self.presenter.remove_widget(id);
        self.request_save();
    }

    /// Drag a widget by a screen-space delta; the world anchor moves by
    /// the delta divided by zoom. Persistence waits for the drag to end.
    pub fn widget_dragged_by(&mut self, id: &str, screen_dx: f64, screen_dy: f64) {
        let dx = self.camera.screen_dist_to_world(screen_dx);
        let dy = self.camera.screen_dist_to_world(screen_dy);
        if self.doc.translate_widget(id, dx, dy) {
            self.presenter.reposition(&self.doc, &self.camera, id);
        }
    }

    /// Pointer released after dragging or resizing a widget.
    pub fn widget_drag_ended(&mut self) {
        self.request_save();
    }

    /// The host finished a resize gesture on a widget.
    pub fn widget_resized(&mut self, id: &str, width: f64, height: f64) {
        if self.doc.set_widget_size(id, width, height) {
            self.request_save();
        }
    }

    /// A keystroke changed a widget's text value.
    pub fn widget_text_changed(&mut self, id: &str, text: &str) {
        if self.doc.set_widget_text(id, text) {
            self.request_save();
        }
    }

    /// Focus moved between widgets (`None` on blur).
    pub fn widget_focus_changed(&mut self, id: Option<String>) {
        self.presenter.set_focus(id);
    }

    // --- Rendering ---

    /// Draw the scene and reposition every widget overlay.
    pub fn render(&mut self, surface: &mut dyn Surface) {
        let preview = self.preview();
        render::draw(
            surface,
            &self.doc,
            &self.camera,
            preview.as_ref(),
            &self.style,
            self.viewport_w,
            self.viewport_h,
        );
        self.presenter.reposition_all(&self.doc, &self.camera);
        self.needs_render = false;
    }

    fn preview(&self) -> Option<Preview<'_>> {
        let Gesture::Drawing { points } = &self.gesture else {
            return None;
        };
        // The preview appears once the pointer has actually moved.
        if points.len() < 2 {
            return None;
        }
        let from = *points.first()?;
        let to = *points.last()?;
        match self.tool {
            Tool::Stroke => Some(Preview::Stroke(points)),
            Tool::Rect => Some(Preview::Rect { from, to }),
            Tool::Circle => Some(Preview::Circle { from, to }),
            _ => None,
        }
    }

    // --- Sync ---

    /// Connect to a room: read the current snapshot (creating an empty one
    /// for a fresh room), apply it with force, and open the save gate.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Load`] when the store is unreachable; the
    /// session stays in the `Error` status and does not retry.
    pub async fn connect(&mut self, store: Rc<dyn Store>, room: RoomId) -> Result<(), SyncError> {
        info!(room = %room, session = %self.session_id, "connecting");
        self.sync.set_status(SyncStatus::Loading);
        self.store = Some(Rc::clone(&store));
        self.room = Some(room.clone());

        match store.get(&room).await {
            Ok(Some(content)) => self.apply_content(content, true),
            Ok(None) => {
                debug!(room = %room, "room absent; creating empty document");
                if let Err(e) = store.insert(&room, &Content::default()).await {
                    self.sync.set_status(SyncStatus::Error);
                    error!(error = %e, "initial insert failed");
                    return Err(SyncError::Load(e));
                }
                self.apply_content(Content::default(), true);
            }
            Err(e) => {
                self.sync.set_status(SyncStatus::Error);
                error!(error = %e, "initial load failed");
                return Err(SyncError::Load(e));
            }
        }

        self.sync.mark_loaded();
        self.sync.set_status(SyncStatus::Ok);
        Ok(())
    }

    /// Apply a remote change notification.
    ///
    /// The whole reconciliation runs under the applying-remote guard so
    /// none of its side effects can re-enter the save path and echo the
    /// snapshot back to the store. Snapshots must be fed in arrival order.
    pub fn apply_remote(&mut self, content: Content) {
        let _guard = self.sync.begin_remote_apply();
        self.apply_content(content, false);
    }

    /// Pump the save debounce. Call periodically (e.g. every animation
    /// frame); flushes at most one due save per call.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Save`] when the due write fails. The document
    /// is untouched and the next edit retries.
    pub async fn pump(&mut self) -> Result<(), SyncError> {
        let now = (self.clock)();
        if !self.sync.save_due(now) {
            return Ok(());
        }
        self.flush().await
    }

    async fn flush(&mut self) -> Result<(), SyncError> {
        let Some(store) = self.store.clone() else {
            return Ok(());
        };
        let Some(room) = self.room.clone() else {
            return Ok(());
        };

        let payload = sync::build_payload(&self.doc);
        match store.update(&room, &payload).await {
            Ok(()) => {
                debug!(room = %room, elements = payload.el.len(), "document saved");
                self.sync.set_status(SyncStatus::Ok);
                Ok(())
            }
            Err(e) => {
                self.sync.set_status(SyncStatus::Error);
                warn!(error = %e, "save failed; next edit retries a full write");
                Err(SyncError::Save(e))
            }
        }
    }

    fn request_save(&mut self) {
        if self.store.is_none() {
            return;
        }
        let now = (self.clock)();
        self.sync.request_save(now);
    }

    /// Reconcile a whole-document snapshot into local state.
    fn apply_content(&mut self, content: Content, force: bool) {
        debug!(
            elements = content.el.len(),
            notes = content.notes.len(),
            texts = content.texts.len(),
            images = content.images.len(),
            force,
            "applying snapshot"
        );

        // Elements have no in-place editable fields: wholesale replacement
        // beats merging.
        self.doc.replace_elements(content.el);

        let mut keep: HashSet<String> = HashSet::new();

        for mut note in content.notes {
            keep.insert(note.id.clone());
            let overwrite = force || !self.presenter.is_focused(&note.id);
            if !overwrite {
                // Mid-typing: the local value wins over the snapshot's.
                if let Some(current) = self.doc.note(&note.id) {
                    note.txt.clone_from(&current.txt);
                }
            }
            self.presenter.apply_note(&note, overwrite);
            self.doc.upsert_note(note);
        }

        for mut text in content.texts {
            keep.insert(text.id.clone());
            let overwrite = force || !self.presenter.is_focused(&text.id);
            if !overwrite {
                if let Some(current) = self.doc.text(&text.id) {
                    text.txt.clone_from(&current.txt);
                }
            }
            self.presenter.apply_text(&text, overwrite);
            self.doc.upsert_text(text);
        }

        for image in content.images {
            keep.insert(image.id.clone());
            self.presenter.apply_image(&image);
            self.doc.upsert_image(image);
        }

        // Remote deletions: on-screen widgets the snapshot no longer lists.
        for id in self.presenter.remove_absent(&keep) {
            self.doc.remove_widget(&id);
        }

        self.needs_render = true;
    }

    // --- Creation helpers ---

    fn create_note_at(&mut self, world: Point) {
        let id = new_id();
        let note = Note {
            id: id.clone(),
            x: world.x,
            y: world.y,
            w: None,
            h: None,
            bg: None,
            txt: String::new(),
        };
        self.presenter.apply_note(&note, true);
        self.doc.upsert_note(note);
        self.presenter.reposition(&self.doc, &self.camera, &id);
        self.presenter.focus_widget(&id);
        self.history.push(HistoryEntry { kind: HistoryKind::Widget, id });
        self.request_save();
    }

    fn create_text_at(&mut self, world: Point) {
        let id = new_id();
        let text = TextBox {
            id: id.clone(),
            x: world.x,
            y: world.y,
            w: None,
            h: None,
            txt: String::new(),
        };
        self.presenter.apply_text(&text, true);
        self.doc.upsert_text(text);
        self.presenter.reposition(&self.doc, &self.camera, &id);
        self.presenter.focus_widget(&id);
        self.history.push(HistoryEntry { kind: HistoryKind::Widget, id });
        self.request_save();
    }

    fn commit_pending(&mut self, points: Vec<Point>, up_screen: Point) {
        let Some(&start) = points.first() else {
            return;
        };
        let end = self.camera.screen_to_world(up_screen);

        let shape = match self.tool {
            // A stroke needs more than one point; a click alone is noise.
            Tool::Stroke if points.len() > 1 => Some(Shape::Stroke { pts: points }),
            Tool::Rect | Tool::Circle => {
                let (x, y, w, h) = render::span(start, end);
                // Degenerate drags are discarded silently.
                (w > MIN_SHAPE_EXTENT).then(|| {
                    if self.tool == Tool::Rect {
                        Shape::Rect { x, y, w, h }
                    } else {
                        Shape::Circle { x, y, w, h }
                    }
                })
            }
            _ => None,
        };

        let Some(shape) = shape else {
            return;
        };
        let id = new_id();
        debug!(id = %id, tool = ?self.tool, "element committed");
        self.doc.add_element(Element {
            id: id.clone(),
            col: self.style.color.clone(),
            lw: self.style.line_width,
            owner: Some(self.session_id.clone()),
            shape,
        });
        self.history.push(HistoryEntry { kind: HistoryKind::Element, id });
        self.request_save();
    }

    fn erase_at(&mut self, world: Point) {
        let Some(id) = hit::hit_test(self.doc.elements(), world) else {
            return;
        };
        let id = id.to_owned();
        self.doc.remove_element(&id);
        debug!(id = %id, "element erased");
        self.needs_render = true;
        self.request_save();
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
