#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;

// =============================================================
// Recording host
// =============================================================

#[derive(Debug, Clone, PartialEq)]
enum Cmd {
    Materialize(WidgetKind, String),
    Position(String, f64, f64),
    Size(String, f64, f64),
    Background(String, String),
    Text(String, String),
    ImageSource(String, String),
    Remove(String),
    Focus(String),
}

#[derive(Default)]
struct RecordingHost {
    log: Rc<RefCell<Vec<Cmd>>>,
}

impl WidgetHost for RecordingHost {
    fn materialize(&mut self, kind: WidgetKind, id: &str) {
        self.log.borrow_mut().push(Cmd::Materialize(kind, id.to_owned()));
    }
    fn set_screen_position(&mut self, id: &str, x: f64, y: f64) {
        self.log.borrow_mut().push(Cmd::Position(id.to_owned(), x, y));
    }
    fn set_size(&mut self, id: &str, w: f64, h: f64) {
        self.log.borrow_mut().push(Cmd::Size(id.to_owned(), w, h));
    }
    fn set_background(&mut self, id: &str, bg: &str) {
        self.log.borrow_mut().push(Cmd::Background(id.to_owned(), bg.to_owned()));
    }
    fn set_text(&mut self, id: &str, text: &str) {
        self.log.borrow_mut().push(Cmd::Text(id.to_owned(), text.to_owned()));
    }
    fn set_image_source(&mut self, id: &str, src: &str) {
        self.log.borrow_mut().push(Cmd::ImageSource(id.to_owned(), src.to_owned()));
    }
    fn remove(&mut self, id: &str) {
        self.log.borrow_mut().push(Cmd::Remove(id.to_owned()));
    }
    fn focus(&mut self, id: &str) {
        self.log.borrow_mut().push(Cmd::Focus(id.to_owned()));
    }
}

fn presenter() -> (Presenter, Rc<RefCell<Vec<Cmd>>>) {
    let host = RecordingHost::default();
    let log = Rc::clone(&host.log);
    (Presenter::new(Box::new(host)), log)
}

fn note(id: &str, x: f64, y: f64, txt: &str) -> Note {
    Note {
        id: id.to_owned(),
        x,
        y,
        w: None,
        h: None,
        bg: None,
        txt: txt.to_owned(),
    }
}

fn contains(log: &Rc<RefCell<Vec<Cmd>>>, cmd: &Cmd) -> bool {
    log.borrow().iter().any(|c| c == cmd)
}

// =============================================================
// Materialization
// =============================================================

#[test]
fn apply_note_materializes_once() {
    let (mut p, log) = presenter();
    p.apply_note(&note("n1", 0.0, 0.0, "a"), true);
    p.apply_note(&note("n1", 1.0, 1.0, "b"), true);

    let creations = log
        .borrow()
        .iter()
        .filter(|c| matches!(c, Cmd::Materialize(..)))
        .count();
    assert_eq!(creations, 1);
    assert!(p.exists("n1"));
}

#[test]
fn apply_note_pushes_background_and_size_when_present() {
    let (mut p, log) = presenter();
    let mut n = note("n1", 0.0, 0.0, "");
    n.bg = Some("#ffee88".to_owned());
    n.w = Some(200.0);
    n.h = Some(150.0);
    p.apply_note(&n, true);

    assert!(contains(&log, &Cmd::Background("n1".to_owned(), "#ffee88".to_owned())));
    assert!(contains(&log, &Cmd::Size("n1".to_owned(), 200.0, 150.0)));
}

#[test]
fn apply_note_skips_text_when_not_overwriting() {
    let (mut p, log) = presenter();
    p.apply_note(&note("n1", 0.0, 0.0, "remote text"), false);
    assert!(!contains(&log, &Cmd::Text("n1".to_owned(), "remote text".to_owned())));
}

#[test]
fn apply_image_sets_source_only_at_creation() {
    let (mut p, log) = presenter();
    let mut img = ImageBox {
        id: "i1".to_owned(),
        x: 0.0,
        y: 0.0,
        w: None,
        h: None,
        src: "data:first".to_owned(),
    };
    p.apply_image(&img);
    img.src = "data:second".to_owned();
    p.apply_image(&img);

    let log = log.borrow();
    let sources: Vec<&Cmd> = log.iter().filter(|c| matches!(c, Cmd::ImageSource(..))).collect();
    assert_eq!(sources, vec![&Cmd::ImageSource("i1".to_owned(), "data:first".to_owned())]);
}

// =============================================================
// Focus
// =============================================================

#[test]
fn focus_widget_issues_command_and_records_owner() {
    let (mut p, log) = presenter();
    p.apply_note(&note("n1", 0.0, 0.0, ""), true);
    p.focus_widget("n1");

    assert!(contains(&log, &Cmd::Focus("n1".to_owned())));
    assert!(p.is_focused("n1"));
    assert_eq!(p.focused(), Some("n1"));
}

#[test]
fn host_reported_blur_clears_focus() {
    let (mut p, _log) = presenter();
    p.apply_note(&note("n1", 0.0, 0.0, ""), true);
    p.focus_widget("n1");
    p.set_focus(None);
    assert!(!p.is_focused("n1"));
}

#[test]
fn removing_focused_widget_clears_focus() {
    let (mut p, log) = presenter();
    p.apply_note(&note("n1", 0.0, 0.0, ""), true);
    p.focus_widget("n1");
    p.remove_widget("n1");

    assert!(contains(&log, &Cmd::Remove("n1".to_owned())));
    assert!(!p.exists("n1"));
    assert_eq!(p.focused(), None);
}

#[test]
fn removing_unknown_widget_issues_no_command() {
    let (mut p, log) = presenter();
    p.remove_widget("ghost");
    assert!(log.borrow().is_empty());
}

// =============================================================
// Remote deletions
// =============================================================

#[test]
fn remove_absent_drops_only_unlisted_ids() {
    let (mut p, _log) = presenter();
    p.apply_note(&note("keep", 0.0, 0.0, ""), true);
    p.apply_note(&note("drop", 0.0, 0.0, ""), true);

    let keep: HashSet<String> = ["keep".to_owned()].into();
    let removed = p.remove_absent(&keep);

    assert_eq!(removed, vec!["drop".to_owned()]);
    assert!(p.exists("keep"));
    assert!(!p.exists("drop"));
}

// =============================================================
// Positioning
// =============================================================

#[test]
fn reposition_uses_camera_transform() {
    let (mut p, log) = presenter();
    let mut doc = Document::new();
    doc.upsert_note(note("n1", 10.0, 20.0, ""));
    p.apply_note(doc.note("n1").unwrap(), true);

    let camera = Camera { pan_x: 100.0, pan_y: 50.0, zoom: 2.0 };
    p.reposition_all(&doc, &camera);

    assert!(contains(&log, &Cmd::Position("n1".to_owned(), 120.0, 90.0)));
}

#[test]
fn reposition_skips_widgets_without_surfaces() {
    let (mut p, log) = presenter();
    let mut doc = Document::new();
    doc.upsert_note(note("n1", 10.0, 20.0, ""));
    // Never applied to the presenter, so no surface exists.
    p.reposition(&doc, &Camera::default(), "n1");
    assert!(log.borrow().is_empty());
}

#[test]
fn ids_of_filters_by_kind() {
    let (mut p, _log) = presenter();
    p.apply_note(&note("n1", 0.0, 0.0, ""), true);
    p.apply_image(&ImageBox {
        id: "i1".to_owned(),
        x: 0.0,
        y: 0.0,
        w: None,
        h: None,
        src: String::new(),
    });

    assert_eq!(p.ids_of(WidgetKind::Note), vec!["n1".to_owned()]);
    assert_eq!(p.ids_of(WidgetKind::Image), vec!["i1".to_owned()]);
    assert!(p.ids_of(WidgetKind::Text).is_empty());
}
