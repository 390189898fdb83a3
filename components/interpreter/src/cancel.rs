//! Cooperative cancellation shared between the runtime and host threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
    // Guards waits so a cancel between the flag check and the wait is not lost.
    lock: Mutex<()>,
    cond: Condvar,
}

/// Cancellation flag with an optional deadline.
///
/// Clones share state: cancelling any clone cancels all of them and wakes
/// every thread blocked in [`CancellationToken::wait_until`].
///
/// # Examples
///
/// ```
/// use interpreter::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// std::thread::spawn(move || handle.cancel()).join().unwrap();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    /// Token without a deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token whose waits may not extend past `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        CancellationToken {
            inner: Arc::new(Inner {
                deadline: Some(deadline),
                ..Inner::default()
            }),
        }
    }

    /// Token whose deadline is `timeout` from now. A timeout too large to
    /// represent means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::new(),
        }
    }

    /// Sets the flag and wakes all waiters. Idempotent.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!("cancellation requested");
        let _guard = self.inner.lock.lock();
        self.inner.cond.notify_all();
    }

    /// True once [`CancellationToken::cancel`] has been called.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// True if the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.inner
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Blocks until `until` or until cancelled, whichever comes first.
    /// Returns true if woken by cancellation.
    pub fn wait_until(&self, until: Instant) -> bool {
        let mut guard = self.inner.lock.lock();
        loop {
            if self.is_cancelled() {
                return true;
            }
            if Instant::now() >= until {
                return false;
            }
            self.inner.cond.wait_until(&mut guard, until);
        }
    }
}
