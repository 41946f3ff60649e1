#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Conversions ---

#[test]
fn screen_to_world_identity() {
    let cam = Camera::default();
    let world = cam.screen_to_world(Point::new(50.0, 75.0));
    assert!(point_approx_eq(world, Point::new(50.0, 75.0)));
}

#[test]
fn screen_to_world_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 2.0 };
    let world = cam.screen_to_world(Point::new(40.0, 30.0));
    assert!(approx_eq(world.x, 10.0));
    assert!(approx_eq(world.y, 10.0));
}

#[test]
fn world_to_screen_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 3.0 };
    let screen = cam.world_to_screen(Point::new(5.0, 5.0));
    assert!(approx_eq(screen.x, 35.0));
    assert!(approx_eq(screen.y, 25.0));
}

#[test]
fn round_trip_with_pan_and_zoom() {
    let cam = Camera { pan_x: 50.0, pan_y: -30.0, zoom: 2.0 };
    let world = Point::new(100.0, 200.0);
    let back = cam.screen_to_world(cam.world_to_screen(world));
    assert!(point_approx_eq(world, back));
}

#[test]
fn screen_dist_to_world_with_zoom() {
    let cam = Camera { pan_x: 999.0, pan_y: -999.0, zoom: 4.0 };
    assert!(approx_eq(cam.screen_dist_to_world(8.0), 2.0));
}

// --- pan_by ---

#[test]
fn pan_by_adds_screen_deltas_unscaled() {
    let mut cam = Camera { pan_x: 10.0, pan_y: 20.0, zoom: 2.0 };
    cam.pan_by(5.0, -3.0);
    assert_eq!(cam.pan_x, 15.0);
    assert_eq!(cam.pan_y, 17.0);
    assert_eq!(cam.zoom, 2.0);
}

// --- zoom_around ---

#[test]
fn zoom_around_keeps_anchor_fixed() {
    let mut cam = Camera { pan_x: 12.0, pan_y: -7.0, zoom: 1.0 };
    let anchor = Point::new(300.0, 200.0);
    let world_before = cam.screen_to_world(anchor);

    cam.zoom_around(anchor, 1.2);

    let world_after = cam.screen_to_world(anchor);
    assert!(point_approx_eq(world_before, world_after));
}

#[test]
fn zoom_around_clamps_at_max() {
    let mut cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 4.9 };
    cam.zoom_around(Point::new(0.0, 0.0), 2.0);
    assert_eq!(cam.zoom, ZOOM_MAX);
}

#[test]
fn zoom_around_clamps_at_min() {
    let mut cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 0.11 };
    cam.zoom_around(Point::new(0.0, 0.0), 0.01);
    assert_eq!(cam.zoom, ZOOM_MIN);
}

#[test]
fn zoom_never_reaches_zero() {
    let mut cam = Camera::default();
    for _ in 0..100 {
        cam.zoom_out(Point::new(400.0, 300.0));
    }
    assert!(cam.zoom >= ZOOM_MIN);
}

#[test]
fn zoom_in_then_inverse_out_restores_state() {
    let mut cam = Camera { pan_x: 33.0, pan_y: -44.0, zoom: 1.5 };
    let anchor = Point::new(123.0, 456.0);

    cam.zoom_around(anchor, 1.2);
    cam.zoom_around(anchor, 1.0 / 1.2);

    assert!(approx_eq(cam.zoom, 1.5));
    assert!(approx_eq(cam.pan_x, 33.0));
    assert!(approx_eq(cam.pan_y, -44.0));
}

#[test]
fn zoom_step_uses_factor_1_2() {
    let mut cam = Camera::default();
    cam.zoom_in(Point::new(0.0, 0.0));
    assert!(approx_eq(cam.zoom, 1.2));
    cam.zoom_out(Point::new(0.0, 0.0));
    assert!(approx_eq(cam.zoom, 1.0));
}

#[test]
fn zoom_at_anchor_moves_pan_toward_cursor() {
    // Zooming in at a point right of center shifts content left.
    let mut cam = Camera::default();
    cam.zoom_in(Point::new(800.0, 0.0));
    assert!(cam.pan_x < 0.0);
    assert_eq!(cam.pan_y, 0.0);
}

// --- Point serde (stroke vertices travel on the wire) ---

#[test]
fn point_serde_roundtrip() {
    let p = Point::new(1.5, -2.5);
    let json = serde_json::to_string(&p).unwrap();
    assert_eq!(json, r#"{"x":1.5,"y":-2.5}"#);
    let back: Point = serde_json::from_str(&json).unwrap();
    assert_eq!(p, back);
}
