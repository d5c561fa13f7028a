use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Process-wide cancellation token.
///
/// Clones share state. Waiters sleep on a condition variable, so a cancel wakes every stream
/// loop immediately instead of at its next tick.
#[derive(Clone, Debug, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    cv: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let mut cancelled = self.lock();
        if !*cancelled {
            *cancelled = true;
            tracing::info!("shutdown requested");
        }
        self.inner.cv.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.lock()
    }

    /// Sleep for up to `timeout`. Returns `true` if cancelled before or during the wait.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .inner
            .cv
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, bool> {
        self.inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
