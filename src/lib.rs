//! Collaborative whiteboard engine.
//!
//! This crate is the state-synchronization and rendering core of a
//! multi-user board: vector elements and anchored widgets on an infinite
//! pannable/zoomable canvas, persisted whole-document to a shared keyed
//! store and reconciled against remote snapshots without clobbering
//! in-flight local edits. The host (a browser shell or a test harness)
//! wires input events into the [`engine::Engine`], implements the widget
//! and drawing seams, pumps the save debounce, and forwards store change
//! notifications back in.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Session engine: edit controller and sync orchestration |
//! | [`doc`] | Document model: elements, widgets, and the in-memory store |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`input`] | Tools, buttons, keys, and the gesture state machine |
//! | [`hit`] | Eraser hit-testing |
//! | [`render`] | Scene rendering over the [`render::Surface`] seam |
//! | [`presenter`] | On-screen widget registry and focus owner |
//! | [`sync`] | Save debounce, status, and the echo-suppression guard |
//! | [`store`] | External store contract and an in-process implementation |
//! | [`export`] | Content bounds and the temporary export viewport |
//! | [`consts`] | Shared numeric constants (zoom limits, debounce, etc.) |
//!
//! The `web` feature adds [`web`] with a canvas-context surface binding.

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod export;
pub mod hit;
pub mod input;
pub mod presenter;
pub mod render;
pub mod store;
pub mod sync;
#[cfg(feature = "web")]
pub mod web;
