//! A cloneable cancellation token for stopping background loops.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Requests a cooperative stop from background threads.
///
/// Clones share the same state, so one clone can be handed to a worker thread and
/// another kept by its owner. Threads that sleep through [`wait_timeout`](Self::wait_timeout)
/// are woken as soon as [`shutdown`](Self::shutdown) is called.
#[derive(Clone)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

struct Inner {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl ShutdownSignal {
    /// Creates a signal that has not fired yet.
    pub fn new() -> Self {
        ShutdownSignal {
            inner: Arc::new(Inner {
                stopped: Mutex::new(false),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Fires the signal and wakes every thread sleeping on it.
    pub fn shutdown(&self) {
        let mut stopped = self
            .inner
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *stopped = true;
        self.inner.condvar.notify_all();
    }

    /// Returns `true` once the signal has fired.
    pub fn is_shutdown(&self) -> bool {
        *self
            .inner
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps for up to `duration`, returning early if the signal fires.
    ///
    /// Returns `true` if the signal has fired and the caller should exit.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let stopped = self
            .inner
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (stopped, _) = self
            .inner
            .condvar
            .wait_timeout_while(stopped, duration, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
