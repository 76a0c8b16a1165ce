use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::model::{EditKey, SaveStatus};

/// Per-key save lifecycle: Idle -> Pending -> Saving -> Saved/Error -> Idle.
///
/// Terminal badges (`Saved`, `Error`) auto-clear after a display window. A
/// new edit may drive any key back to `Pending` at any time; doing so cancels
/// the key's auto-clear timer so a stale clear can never wipe a fresh state.
///
/// `clear_all` bumps an epoch. Save transitions carry the epoch they were
/// scheduled under and are ignored once it is stale, so a persist that was
/// in flight across a dispose or a snapshot reload cannot re-create a badge
/// for a key the engine just wiped.
#[derive(Clone)]
pub struct StatusTracker {
    inner: Arc<Mutex<StatusInner>>,
    saved_clear: Duration,
    error_clear: Duration,
}

struct StatusInner {
    states: HashMap<EditKey, SaveStatus>,
    clears: HashMap<EditKey, JoinHandle<()>>,
    epoch: u64,
}

impl StatusTracker {
    pub fn new(saved_clear: Duration, error_clear: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StatusInner {
                states: HashMap::new(),
                clears: HashMap::new(),
                epoch: 0,
            })),
            saved_clear,
            error_clear,
        }
    }

    /// `Idle` for any key never touched or already cleared.
    pub fn get(&self, key: EditKey) -> SaveStatus {
        self.lock()
            .states
            .get(&key)
            .copied()
            .unwrap_or(SaveStatus::Idle)
    }

    /// Epoch to stamp onto transitions scheduled from this point on.
    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    /// An edit occurred and its debounce window is running. Always legal,
    /// supersedes any pending auto-clear.
    pub fn mark_pending(&self, key: EditKey) {
        let mut inner = self.lock();
        if let Some(handle) = inner.clears.remove(&key) {
            handle.abort();
        }
        inner.states.insert(key, SaveStatus::Pending);
    }

    /// The debounce timer fired and the persistence call started. Ignored
    /// when `epoch` is stale.
    pub fn mark_saving(&self, key: EditKey, epoch: u64) {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            return;
        }
        if let Some(handle) = inner.clears.remove(&key) {
            handle.abort();
        }
        inner.states.insert(key, SaveStatus::Saving);
    }

    /// Persistence resolved; show the badge, then fall back to idle.
    /// Ignored when `epoch` is stale.
    pub fn mark_saved(&self, key: EditKey, epoch: u64) {
        self.settle(key, SaveStatus::Saved, self.saved_clear, epoch);
    }

    /// Persistence rejected; show the badge, then fall back to idle.
    /// Ignored when `epoch` is stale.
    pub fn mark_error(&self, key: EditKey, epoch: u64) {
        self.settle(key, SaveStatus::Error, self.error_clear, epoch);
    }

    fn settle(&self, key: EditKey, status: SaveStatus, window: Duration, epoch: u64) {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            return;
        }
        if let Some(handle) = inner.clears.remove(&key) {
            handle.abort();
        }
        inner.states.insert(key, status);

        let shared = Arc::clone(&self.inner);
        let clear = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let mut inner = shared.lock().unwrap_or_else(|p| p.into_inner());
            // Only clear if nothing superseded this badge in the meantime.
            if inner.states.get(&key) == Some(&status) {
                inner.states.remove(&key);
            }
            inner.clears.remove(&key);
        });
        inner.clears.insert(key, clear);
    }

    /// Drop every state, cancel every auto-clear timer, and invalidate all
    /// outstanding transitions. Used on snapshot reload and on dispose.
    pub fn clear_all(&self) {
        let mut inner = self.lock();
        for (_, handle) in inner.clears.drain() {
            handle.abort();
        }
        inner.states.clear();
        inner.epoch += 1;
    }

    /// Keys currently in a non-idle state, for UI badge rendering.
    pub fn active_keys(&self) -> Vec<(EditKey, SaveStatus)> {
        self.lock()
            .states
            .iter()
            .map(|(k, s)| (*k, *s))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StatusInner> {
        // A poisoned lock only means a panicking task held it; the map is
        // still structurally sound.
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}
