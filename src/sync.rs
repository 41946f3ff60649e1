//! Sync plumbing: save debounce, persistence status, echo-suppression guard.
//!
//! DESIGN
//! ======
//! Outbound writes are debounced: every local mutation re-arms a single
//! fixed-delay deadline, and only the arm that survives un-cancelled
//! actually flushes — N edits inside the window produce one write. The
//! engine pumps [`Debounce::fire`] with the host clock; there is no hidden
//! timer thread.
//!
//! Inbound snapshots are applied under a [`RemoteApplyGuard`], which raises
//! the applying-remote flag for exactly its own lifetime (released on every
//! exit path, including unwinding) so reconciliation side effects cannot
//! re-enter [`SyncState::request_save`] and echo the received data straight
//! back to the store.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::consts::{ANON_OWNER, SAVE_DEBOUNCE_MS};
use crate::doc::Document;
use crate::store::{Content, StoreError};

/// Persistence status surfaced to the host's indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// No store attached yet.
    #[default]
    Idle,
    /// Initial load in flight.
    Loading,
    /// A debounced save is pending or in flight.
    Saving,
    /// Last load/save completed.
    Ok,
    /// Connection or write failure; the in-memory document remains the
    /// source of truth.
    Error,
}

/// Sync failure taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The initial load failed. Fatal to the session; no retry.
    #[error("initial load failed: {0}")]
    Load(#[source] StoreError),
    /// A debounced write failed. The next edit's debounce retries a full
    /// write, which is naturally idempotent.
    #[error("save failed: {0}")]
    Save(#[source] StoreError),
}

/// Tuning knobs for the sync engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncConfig {
    /// Debounce window for outbound saves, in milliseconds.
    pub debounce_ms: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { debounce_ms: SAVE_DEBOUNCE_MS }
    }
}

impl SyncConfig {
    /// Load config from the environment.
    ///
    /// - `SAVE_DEBOUNCE_MS`: default 500
    #[must_use]
    pub fn from_env() -> Self {
        Self { debounce_ms: env_parse("SAVE_DEBOUNCE_MS", SAVE_DEBOUNCE_MS) }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Cancellable single-deadline scheduled task.
///
/// The contract is "last scheduled call wins": re-arming moves the one
/// deadline instead of queuing a second, and [`Debounce::fire`] reports
/// readiness exactly once per armed deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct Debounce {
    delay_ms: f64,
    deadline: Option<f64>,
}

impl Debounce {
    #[must_use]
    pub fn new(delay_ms: f64) -> Self {
        Self { delay_ms, deadline: None }
    }

    /// Schedule (or reschedule) the deadline `delay_ms` from `now_ms`.
    pub fn arm(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.delay_ms);
    }

    /// Drop any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once the armed deadline has passed; consumes the deadline.
    pub fn fire(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(due) if now_ms >= due => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Shared handle to the applying-remote flag.
///
/// The flag itself is private to the handle; the only way to raise it is
/// through an RAII [`RemoteApplyGuard`], so it cannot leak set.
#[derive(Debug, Clone, Default)]
pub struct RemoteFlag(Rc<Cell<bool>>);

impl RemoteFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.get()
    }

    /// Raise the flag for the guard's lifetime.
    #[must_use]
    pub fn guard(&self) -> RemoteApplyGuard {
        self.0.set(true);
        RemoteApplyGuard { flag: Rc::clone(&self.0) }
    }
}

/// Scoped "a remote snapshot is being applied" marker. Dropping it lowers
/// the flag, on ordinary returns and during unwinding alike.
pub struct RemoteApplyGuard {
    flag: Rc<Cell<bool>>,
}

impl Drop for RemoteApplyGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Process-wide sync state for one session.
#[derive(Debug, Clone)]
pub struct SyncState {
    status: SyncStatus,
    loaded: bool,
    remote: RemoteFlag,
    debounce: Debounce,
}

impl SyncState {
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        Self {
            status: SyncStatus::Idle,
            loaded: false,
            remote: RemoteFlag::new(),
            debounce: Debounce::new(config.debounce_ms),
        }
    }

    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn set_status(&mut self, status: SyncStatus) {
        if self.status != status {
            debug!(?status, "sync status");
            self.status = status;
        }
    }

    /// Whether the initial load has completed, gating all saves.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    #[must_use]
    pub fn applying_remote(&self) -> bool {
        self.remote.is_set()
    }

    /// Raise the applying-remote flag for the returned guard's lifetime.
    #[must_use]
    pub fn begin_remote_apply(&self) -> RemoteApplyGuard {
        self.remote.guard()
    }

    /// Request a debounced save at `now_ms`.
    ///
    /// No-op while a remote snapshot is being applied or before the initial
    /// load completes (the caller additionally requires a store connection).
    /// Returns whether the deadline was (re)armed.
    pub fn request_save(&mut self, now_ms: f64) -> bool {
        if self.remote.is_set() || !self.loaded {
            return false;
        }
        self.set_status(SyncStatus::Saving);
        self.debounce.arm(now_ms);
        true
    }

    /// True once the debounced save is due; consumes the deadline.
    pub fn save_due(&mut self, now_ms: f64) -> bool {
        self.debounce.fire(now_ms)
    }

    #[must_use]
    pub fn save_pending(&self) -> bool {
        self.debounce.is_armed()
    }
}

/// Serialize the document into the wire payload for a whole-document write.
///
/// Elements missing an owner are stamped with the anonymous marker; widget
/// records are written exactly as the document holds them, which is the
/// live on-screen state (every host edit lands in the document before any
/// flush reads it).
#[must_use]
pub fn build_payload(doc: &Document) -> Content {
    let el = doc
        .elements()
        .iter()
        .map(|e| {
            let mut e = e.clone();
            if e.owner.is_none() {
                e.owner = Some(ANON_OWNER.to_owned());
            }
            e
        })
        .collect();

    Content {
        el,
        notes: doc.notes().to_vec(),
        texts: doc.texts().to_vec(),
        images: doc.images().to_vec(),
    }
}
