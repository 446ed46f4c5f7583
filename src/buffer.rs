//! Per-station holding area for pending serialized entries.
//!
//! Each ground station owns exactly one `PriorityBuffer`: the router pushes
//! into it from whatever thread the message source uses, and that station's
//! drain worker is its only consumer. The buffer is unbounded and pops
//! entries in lexicographic order of the entry text, not arrival order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::Notify;

/// Errors that can occur when taking from a buffer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("buffer is closed and drained")]
    Closed,
}

struct Inner {
    heap: BinaryHeap<Reverse<String>>,
    closed: bool,
}

/// Unbounded, thread-safe buffer ordered by entry text.
pub struct PriorityBuffer {
    inner: Mutex<Inner>,
    available: Notify,
}

impl PriorityBuffer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                heap: BinaryHeap::new(),
                closed: false,
            }),
            available: Notify::new(),
        }
    }

    /// Enqueue an entry. Never blocks; entries pushed after `close` are
    /// discarded.
    pub fn add(&self, entry: String) {
        {
            let mut inner = self.inner.lock();
            if inner.closed {
                return;
            }
            inner.heap.push(Reverse(entry));
        }
        self.available.notify_one();
    }

    /// Remove and return the lexicographically smallest entry, suspending
    /// until one is available. Fails only once the buffer is closed and
    /// fully drained.
    pub async fn take(&self) -> Result<String, BufferError> {
        loop {
            {
                let mut inner = self.inner.lock();
                if let Some(Reverse(entry)) = inner.heap.pop() {
                    return Ok(entry);
                }
                if inner.closed {
                    return Err(BufferError::Closed);
                }
            }
            // notify_one stores a permit when no consumer is parked, so an
            // add between the unlock above and this await is not lost.
            self.available.notified().await;
        }
    }

    /// Mark the buffer closed and wake the consumer. Entries already
    /// buffered can still be taken.
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.available.notify_one();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PriorityBuffer {
    fn default() -> Self {
        Self::new()
    }
}
