use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Bounded counter gating how many animated streams run at once.
///
/// The counter only moves through atomic read-modify-write updates, so concurrent acquirers can
/// never both take the last slot. Prefer [`StreamAdmission::try_admit`], whose permit releases
/// on drop, over pairing [`try_acquire`](StreamAdmission::try_acquire) and
/// [`release`](StreamAdmission::release) by hand.
#[derive(Debug)]
pub struct StreamAdmission {
    active: AtomicUsize,
    max: usize,
    idle_lock: Mutex<()>,
    idle: Condvar,
}

impl StreamAdmission {
    pub fn new(max_streams: usize) -> Self {
        Self {
            active: AtomicUsize::new(0),
            max: max_streams,
            idle_lock: Mutex::new(()),
            idle: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.max
    }

    /// Take one slot if `active < max`. Leaves the counter untouched on failure.
    pub fn try_acquire(&self) -> bool {
        self.active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max).then_some(n + 1)
            })
            .is_ok()
    }

    /// Return one slot. Must be paired with exactly one successful acquire.
    ///
    /// A release with no slot held saturates at zero and is logged rather than wrapping.
    pub fn release(&self) {
        match self
            .active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => {
                let _guard = self.idle_lock.lock().unwrap_or_else(PoisonError::into_inner);
                self.idle.notify_all();
            }
            Ok(_) => {}
            Err(_) => tracing::warn!("stream admission released with no active streams"),
        }
    }

    /// Momentary snapshot for observability.
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Scoped acquisition: the returned permit releases its slot exactly once when dropped.
    pub fn try_admit(&self) -> Option<AdmissionPermit<'_>> {
        self.try_acquire().then_some(AdmissionPermit {
            admission: self,
            released: false,
        })
    }

    /// Block until no stream holds a slot or `grace` elapses. Returns `true` when idle.
    pub fn wait_idle(&self, grace: Duration) -> bool {
        let deadline = Instant::now().checked_add(grace);
        let mut guard = self.idle_lock.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if self.active_count() == 0 {
                return true;
            }
            guard = match deadline {
                Some(at) => {
                    let now = Instant::now();
                    if now >= at {
                        return false;
                    }
                    self.idle
                        .wait_timeout(guard, at - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self.idle.wait(guard).unwrap_or_else(PoisonError::into_inner),
            };
        }
    }
}

/// One held admission slot.
#[derive(Debug)]
pub struct AdmissionPermit<'a> {
    admission: &'a StreamAdmission,
    released: bool,
}

impl AdmissionPermit<'_> {
    /// Release now instead of at scope end.
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.admission.release();
        }
    }
}

impl Drop for AdmissionPermit<'_> {
    fn drop(&mut self) {
        self.release_once();
    }
}
