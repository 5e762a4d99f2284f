//! Trailing-edge debounce timer
//!
//! A single-slot coalescer: each call schedules the action to run after the
//! window, cancelling any firing still pending. Rapid repeated calls thus
//! collapse into one action invocation carrying the latest value. Used for
//! slider-driven config commits and for whole-graph autosave.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Coalesces rapid calls into a single deferred action ("latest wins")
///
/// Must be used from within a Tokio runtime; the pending firing is aborted
/// on [`Debouncer::cancel`] and on drop, so a torn-down owner never fires.
pub struct Debouncer<T: Send + 'static> {
    window: Duration,
    action: Arc<dyn Fn(T) + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer that runs `action` one `window` after the most
    /// recent call
    pub fn new(window: Duration, action: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            window,
            action: Arc::new(action),
            pending: Mutex::new(None),
        }
    }

    /// Schedule the action with `value`, replacing any pending schedule
    pub fn call(&self, value: T) {
        let action = Arc::clone(&self.action);
        let window = self.window;
        let mut pending = self.pending.lock();
        // Abort before scheduling: a nearly-expired firing must not slip
        // through and deliver a stale value ahead of this one
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            action(value);
        }));
    }

    /// Abort the pending firing, if any, without running the action
    pub fn cancel(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }

    /// Whether a firing is currently scheduled
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
