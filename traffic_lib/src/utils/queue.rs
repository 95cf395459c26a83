//! A blocking FIFO queue for handing values between threads.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// An unbounded, thread-safe FIFO queue whose consumers block while it is empty.
///
/// Every value passed to [`send`](Self::send) is handed to exactly one call of
/// [`receive`](Self::receive) (or one of its variants), in the order it was sent.
/// Waiting consumers park on a condition variable, so the internal lock is released
/// while they sleep.
pub struct BlockingQueue<T> {
    data: Mutex<State<T>>,
    not_empty: Condvar,
}

impl<T> BlockingQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        BlockingQueue {
            data: Mutex::new(State {
                items: VecDeque::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
        }
    }

    // A panic while holding the lock cannot leave `State` half-updated, so the
    // poisoned guard is still good to use.
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `item` to the tail of the queue and wakes one waiting consumer.
    ///
    /// Never blocks beyond the short critical section.
    pub fn send(&self, item: T) {
        let mut state = self.lock();
        state.items.push_back(item);
        tracing::trace!(len = state.items.len(), "message enqueued");
        self.not_empty.notify_one();
    }

    /// Removes and returns the head of the queue, blocking until one is available.
    ///
    /// This call waits for data only: closing the queue does not release it. Use
    /// [`receive_or_closed`](Self::receive_or_closed) when the caller must observe
    /// shutdown.
    pub fn receive(&self) -> T {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                tracing::trace!(len = state.items.len(), "message dequeued");
                return item;
            }
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`receive`](Self::receive), but returns `None` once the queue has been
    /// closed and every remaining item has been drained.
    pub fn receive_or_closed(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                tracing::trace!(len = state.items.len(), "message dequeued");
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Removes and returns the head of the queue without waiting.
    pub fn try_receive(&self) -> Option<T> {
        self.lock().items.pop_front()
    }

    /// Marks the queue as closed and wakes every waiting consumer.
    ///
    /// Items already in the queue stay available. Closing twice is harmless.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        self.not_empty.notify_all();
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of items waiting to be received.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Returns `true` if no items are waiting.
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
