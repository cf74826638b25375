//! Debounce controller.
//!
//! Each [`Debouncer::schedule`] call replaces the pending action and restarts the quiet-period
//! timer; only the last action scheduled within a window runs. Cancelling (explicitly or by
//! dropping the debouncer) stops a timer that has not fired yet. An action that has already
//! started runs to completion.
//!
//! Scheduling spawns onto the current tokio runtime.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::constants::DEFAULT_DEBOUNCE_MS;

pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    fired: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
            fired: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `action` once `delay` passes without another `schedule` or `cancel`.
    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let fired = Arc::clone(&self.fired);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fired.fetch_add(1, Ordering::Relaxed);
            // Detach so a later reschedule only cancels the timer, never in-flight work.
            tokio::spawn(action);
        });

        if let Some(previous) = self.pending.lock().replace(timer) {
            previous.abort();
            trace!("Rescheduled debounced action");
        }
    }

    /// Cancels the pending timer. Returns `true` if one had not fired yet.
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(timer) => {
                let was_pending = !timer.is_finished();
                timer.abort();
                was_pending
            }
            None => false,
        }
    }

    /// Returns `true` while a timer is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Number of timers that have fired since creation.
    pub fn fired_count(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.get_mut().take() {
            timer.abort();
        }
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}
