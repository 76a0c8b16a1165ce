use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::error::EngineError;
use crate::model::EditKey;

/// Trailing-edge debounce, one timer per edit key.
///
/// Each `schedule` call replaces the key's pending timer, so only the last
/// edit inside a window of continuous typing fires. Timers for different
/// keys never interact. Once a timer has elapsed its fire future runs to
/// completion even if the scheduler is later cancelled or disposed:
/// in-flight persistence calls are fire-and-forget.
#[derive(Clone)]
pub struct SaveScheduler {
    inner: Arc<Mutex<SchedInner>>,
    delay: Duration,
}

struct SchedInner {
    timers: HashMap<EditKey, JoinHandle<()>>,
    disposed: bool,
}

impl SaveScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedInner {
                timers: HashMap::new(),
                disposed: false,
            })),
            delay,
        }
    }

    /// Arm (or re-arm) the key's debounce timer. `fire` carries the latest
    /// payload; a newer call for the same key cancels this one wholesale.
    pub fn schedule<F>(&self, key: EditKey, fire: F) -> Result<(), EngineError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut inner = self.lock();
        if inner.disposed {
            return Err(EngineError::Disposed);
        }
        if let Some(stale) = inner.timers.remove(&key) {
            stale.abort();
        }

        let delay = self.delay;
        let shared = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Drop our map entry before firing: from here the save is
            // in flight and no longer cancellable via this scheduler.
            {
                let mut inner = shared.lock().unwrap_or_else(|p| p.into_inner());
                inner.timers.remove(&key);
            }
            fire.await;
        });
        inner.timers.insert(key, handle);
        Ok(())
    }

    /// Cancel every pending timer without disposing. Used when a fresh
    /// snapshot invalidates all scheduled local saves.
    pub fn cancel_all(&self) {
        let mut inner = self.lock();
        for (_, handle) in inner.timers.drain() {
            handle.abort();
        }
    }

    /// Cancel everything and refuse all future scheduling. Guarantees that
    /// no timer fires after this returns.
    pub fn dispose(&self) {
        let mut inner = self.lock();
        inner.disposed = true;
        for (_, handle) in inner.timers.drain() {
            handle.abort();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    /// Number of keys with an armed, not-yet-fired timer.
    pub fn pending_count(&self) -> usize {
        self.lock().timers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SchedInner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}
