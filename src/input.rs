//! Input model: tools, mouse buttons, keys, and the gesture state machine.
//!
//! `Tool` captures the user's intent at pointer-down time; `Gesture` is the
//! active interaction being tracked between pointer-down and pointer-up.
//! The edit controller in [`crate::engine`] consumes these types.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Hand / selection tool (default). Dragging with it pans the viewport.
    #[default]
    Select,
    /// Dedicated pan tool.
    Pan,
    /// Freehand stroke.
    Stroke,
    /// Draw a rectangle.
    Rect,
    /// Draw a circle.
    Circle,
    /// Create a sticky note.
    Note,
    /// Create a text box.
    Text,
    /// Delete elements and widgets under the pointer.
    Erase,
}

impl Tool {
    /// Whether pointer-down with this tool materializes a widget immediately.
    #[must_use]
    pub fn creates_widget(self) -> bool {
        matches!(self, Self::Note | Self::Text)
    }

    /// Whether this tool accumulates a pending shape between down and up.
    #[must_use]
    pub fn draws_shape(self) -> bool {
        matches!(self, Self::Stroke | Self::Rect | Self::Circle)
    }

    /// Whether a plain drag with this tool pans the viewport.
    #[must_use]
    pub fn pans(self) -> bool {
        matches!(self, Self::Select | Self::Pan)
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click). Always pans.
    Middle,
    /// Right mouse button.
    Secondary,
}

/// A keyboard key, carrying the name as reported by the browser
/// (e.g. `"Space"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// The active pointer gesture.
///
/// Each variant carries the context needed to process pointer-move deltas
/// and emit the final document mutation on release.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the viewport.
    Panning {
        /// Screen position of the previous pointer event, for the pan delta.
        last_screen: Point,
    },
    /// Eraser drag: every move hit-tests and deletes at most one element.
    Erasing,
    /// Accumulating a pending stroke or shape in world space.
    ///
    /// Strokes use every point; rect/circle previews derive their box from
    /// the first point and the latest one.
    Drawing {
        points: Vec<Point>,
    },
}

/// Stroke color and line width currently selected in the host's pickers.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolStyle {
    pub color: String,
    pub line_width: f64,
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self { color: "#1F1A17".to_owned(), line_width: 2.0 }
    }
}
