//! External document store contract and an in-process implementation.
//!
//! The backend is a keyed document store: one row per room, whole-document
//! reads and writes, plus a change subscription that delivers the new
//! content whenever the row changes (including the echo of this session's
//! own writes). The [`Store`] trait is the seam a real backend plugs into;
//! [`MemoryStore`] implements it in-process for tests and demos.
//!
//! ERROR HANDLING
//! ==============
//! An absent row is not an error (`get` returns `None`; the sync engine
//! recovers by inserting an empty document). Malformed snapshot fields
//! decode as empty collections via [`Content::from_value`], never a fault.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::doc::{Element, ImageBox, Note, TextBox};

/// Store failure taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store is unreachable or misconfigured. Fatal to the session.
    #[error("store connection failed: {0}")]
    Connection(String),
    /// A write was rejected or lost. The in-memory document stays
    /// authoritative and the next edit retries a full write.
    #[error("write failed: {0}")]
    Write(String),
    /// The room identifier normalizes to nothing.
    #[error("malformed room id")]
    InvalidRoom,
}

/// A normalized room identifier.
///
/// Raw input (typically a URL query parameter) is trimmed and every byte
/// outside `[A-Za-z0-9_.-]` is replaced with `_`; an id that normalizes to
/// the empty string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    /// Normalize a raw room name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidRoom`] when nothing remains after
    /// trimming.
    pub fn new(raw: &str) -> Result<Self, StoreError> {
        let cleaned: String = raw
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if cleaned.is_empty() {
            return Err(StoreError::InvalidRoom);
        }
        Ok(Self(cleaned))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The whole-document wire payload stored per room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub el: Vec<Element>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub texts: Vec<TextBox>,
    #[serde(default)]
    pub images: Vec<ImageBox>,
}

impl Content {
    /// Decode a raw JSON value leniently: each collection that is missing,
    /// null, or malformed becomes empty instead of failing the snapshot.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Self {
        Self {
            el: lenient_collection(value, "el"),
            notes: lenient_collection(value, "notes"),
            texts: lenient_collection(value, "texts"),
            images: lenient_collection(value, "images"),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.el.is_empty() && self.notes.is_empty() && self.texts.is_empty() && self.images.is_empty()
    }
}

fn lenient_collection<T: DeserializeOwned>(value: &serde_json::Value, key: &str) -> Vec<T> {
    match value.get(key) {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(list) => list,
            Err(e) => {
                warn!(key, error = %e, "malformed snapshot collection treated as empty");
                Vec::new()
            }
        },
    }
}

/// Callback invoked with the new content whenever a room's row changes.
pub type ChangeCallback = Box<dyn FnMut(Content)>;

/// Keyed document store contract.
///
/// Futures need not be `Send`: the engine is single-threaded and
/// event-driven, suspending only at these I/O boundaries.
#[async_trait(?Send)]
pub trait Store {
    /// Read the room's current content, or `None` when the row is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] when the store is unreachable.
    async fn get(&self, room: &RoomId) -> Result<Option<Content>, StoreError>;

    /// Create the room's row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] when the row already exists or the
    /// write is rejected.
    async fn insert(&self, room: &RoomId, content: &Content) -> Result<(), StoreError>;

    /// Replace the room's content wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] when the write is rejected.
    async fn update(&self, room: &RoomId, content: &Content) -> Result<(), StoreError>;

    /// Register a callback for remote changes to the room, delivered in
    /// arrival order. A session's own writes are echoed back like any
    /// other change.
    fn subscribe(&self, room: &RoomId, on_change: ChangeCallback);
}

/// In-process store used by tests and single-process demos.
///
/// Change notifications are queued on every update and handed to
/// subscribers when the host pumps [`MemoryStore::deliver_pending`],
/// modeling a transport that delivers between turns of the event loop.
#[derive(Default)]
pub struct MemoryStore {
    rooms: RefCell<HashMap<String, Content>>,
    subscribers: RefCell<HashMap<String, Vec<ChangeCallback>>>,
    pending: RefCell<Vec<(String, Content)>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver all queued change notifications in arrival order.
    pub fn deliver_pending(&self) {
        let queued: Vec<(String, Content)> = self.pending.borrow_mut().drain(..).collect();
        for (room, content) in queued {
            let mut subscribers = self.subscribers.borrow_mut();
            if let Some(callbacks) = subscribers.get_mut(&room) {
                for callback in callbacks.iter_mut() {
                    callback(content.clone());
                }
            }
        }
    }
}

#[async_trait(?Send)]
impl Store for MemoryStore {
    async fn get(&self, room: &RoomId) -> Result<Option<Content>, StoreError> {
        Ok(self.rooms.borrow().get(room.as_str()).cloned())
    }

    async fn insert(&self, room: &RoomId, content: &Content) -> Result<(), StoreError> {
        let mut rooms = self.rooms.borrow_mut();
        if rooms.contains_key(room.as_str()) {
            return Err(StoreError::Write(format!("room {room} already exists")));
        }
        rooms.insert(room.as_str().to_owned(), content.clone());
        Ok(())
    }

    async fn update(&self, room: &RoomId, content: &Content) -> Result<(), StoreError> {
        self.rooms
            .borrow_mut()
            .insert(room.as_str().to_owned(), content.clone());
        self.pending
            .borrow_mut()
            .push((room.as_str().to_owned(), content.clone()));
        Ok(())
    }

    fn subscribe(&self, room: &RoomId, on_change: ChangeCallback) {
        self.subscribers
            .borrow_mut()
            .entry(room.as_str().to_owned())
            .or_default()
            .push(on_change);
    }
}
