//! Cancellable delayed-task scheduling.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs an action after a quiet period, discarding superseded schedules.
///
/// Each [`schedule`](Debouncer::schedule) aborts the previously scheduled
/// task before starting a new delay, so only the latest action within the
/// window fires (last-wins). Dropping the debouncer cancels any pending
/// task, which keeps a torn-down widget from submitting posthumously.
///
/// Requires a running tokio runtime at schedule time.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Schedules `action` to run after the quiet period.
    ///
    /// Aborts whatever was scheduled before; the previous action never
    /// runs once superseded.
    pub fn schedule<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.replace(handle) {
                previous.abort();
            }
        }
    }

    /// Cancels the pending action, then runs `action` synchronously.
    pub fn fire_now<F>(&self, action: F)
    where
        F: FnOnce(),
    {
        self.cancel();
        action();
    }

    /// Cancels the pending action, if any.
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        // Clones share the pending slot; only the last drop cancels.
        if Arc::strong_count(&self.pending) == 1 {
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;

    async fn settle(ms: u64) {
        // Let tasks spawned just before this call register their timers
        // at the current mock time, then advance past them.
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(ms)).await;
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_quiet_period() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        debouncer.schedule(move || {
            f.fetch_add(1, Ordering::SeqCst);
        });

        settle(499).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        settle(10).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_supersedes_pending() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let fired = Arc::new(AtomicUsize::new(0));

        let f = fired.clone();
        debouncer.schedule(move || {
            f.fetch_add(1, Ordering::SeqCst);
        });
        settle(300).await;

        let f = fired.clone();
        debouncer.schedule(move || {
            f.fetch_add(10, Ordering::SeqCst);
        });
        settle(600).await;

        // Only the later action ran.
        assert_eq!(fired.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        debouncer.schedule(move || {
            f.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();
        settle(600).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fire_now_skips_the_delay_and_pending() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let fired = Arc::new(AtomicUsize::new(0));

        let f = fired.clone();
        debouncer.schedule(move || {
            f.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.fire_now(|| {
            fired.fetch_add(100, Ordering::SeqCst);
        });
        settle(600).await;

        assert_eq!(fired.load(Ordering::SeqCst), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        debouncer.schedule(move || {
            f.fetch_add(1, Ordering::SeqCst);
        });
        drop(debouncer);
        settle(600).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
