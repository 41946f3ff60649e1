//! Shared numeric constants for the board engine.

// ── Camera ──────────────────────────────────────────────────────

/// Lower zoom bound; the viewport transform must never collapse.
pub const ZOOM_MIN: f64 = 0.1;

/// Upper zoom bound.
pub const ZOOM_MAX: f64 = 5.0;

/// Multiplicative zoom factor per wheel notch or zoom-button press.
pub const ZOOM_STEP: f64 = 1.2;

// ── Shape commit ────────────────────────────────────────────────

/// Minimum dragged-box width (world units) for a rect/circle to commit.
/// Smaller drags are discarded as accidental clicks.
pub const MIN_SHAPE_EXTENT: f64 = 2.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Eraser pick distance from any stroke vertex, in world units.
pub const STROKE_HIT_TOLERANCE: f64 = 10.0;

// ── Sync ────────────────────────────────────────────────────────

/// Outbound save debounce window in milliseconds.
pub const SAVE_DEBOUNCE_MS: f64 = 500.0;

/// Owner marker stamped on persisted elements that have none.
pub const ANON_OWNER: &str = "anon";

// ── Export ──────────────────────────────────────────────────────

/// World-space padding added around content bounds when exporting.
pub const EXPORT_PADDING: f64 = 50.0;

/// Fallback export extent for an empty board, before padding.
pub const EXPORT_FALLBACK_WIDTH: f64 = 800.0;
pub const EXPORT_FALLBACK_HEIGHT: f64 = 600.0;
