//! Browser binding: a [`Surface`] over `CanvasRenderingContext2d`.
//!
//! This module is the only place that touches `web_sys` and only exists
//! with the `web` feature. Canvas2D calls that can fail are ignored the
//! way a lost frame is ignored; the next render repaints everything.

use web_sys::CanvasRenderingContext2d;

use crate::camera::{Camera, Point};
use crate::render::Surface;

/// Board background fill.
const BACKGROUND_COLOR: &str = "#f5f5f5";

/// 2D canvas context wrapper implementing the engine's render seam.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    #[must_use]
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl Surface for CanvasSurface {
    fn begin_frame(&mut self, width: f64, height: f64) {
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx.set_fill_style_str(BACKGROUND_COLOR);
        self.ctx.fill_rect(0.0, 0.0, width, height);
    }

    fn apply_camera(&mut self, camera: &Camera) {
        let _ = self.ctx.translate(camera.pan_x, camera.pan_y);
        let _ = self.ctx.scale(camera.zoom, camera.zoom);
    }

    fn set_stroke_style(&mut self, color: &str, line_width: f64) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
    }

    fn polyline(&mut self, pts: &[Point]) {
        let Some(first) = pts.first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in &pts[1..] {
            self.ctx.line_to(p.x, p.y);
        }
        self.ctx.stroke();
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.stroke_rect(x, y, w, h);
    }

    fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(cx, cy, radius, 0.0, 2.0 * std::f64::consts::PI)
            .is_ok()
        {
            self.ctx.stroke();
        }
    }
}

/// Milliseconds clock for [`crate::engine::Engine`], backed by
/// `performance.now()`.
#[must_use]
pub fn performance_clock() -> crate::engine::Clock {
    Box::new(|| {
        web_sys::window()
            .and_then(|w| w.performance())
            .map_or(0.0, |p| p.now())
    })
}
