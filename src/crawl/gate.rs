//! Admission control for crawl and download branches.
//!
//! The gate tracks how many branches are currently in flight and decides,
//! per branch, whether it may run as a new spawned task or must run inline
//! on the caller. The limit is a soft admission threshold: the active count
//! bounds the rate of new task creation, not the total parallelism of deep
//! recursion, because descendants acquire and release independently.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Decision returned by [`ConcurrencyGate::admit`] for a single branch.
#[derive(Debug)]
pub enum Admission {
    /// The branch was admitted and should be spawned as its own task.
    /// The guard must live for the duration of the branch's direct work.
    Concurrent(SlotGuard),
    /// The gate is saturated; the branch runs synchronously on the caller.
    Inline,
}

/// Shared admission gate, cheap to clone across branches.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    inner: Arc<GateInner>,
}

#[derive(Debug)]
struct GateInner {
    active: AtomicUsize,
    limit: usize,
}

/// RAII slot held by an admitted branch.
///
/// Dropping the guard releases the slot. Moving it into the spawned task
/// guarantees exactly one release on every exit path, including panics
/// unwound through the task.
#[derive(Debug)]
pub struct SlotGuard {
    inner: Arc<GateInner>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.inner.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConcurrencyGate {
    /// Creates a gate admitting up to `limit` concurrent branches.
    ///
    /// A limit of 0 refuses every admission, serializing the whole crawl
    /// on the calling task.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(GateInner {
                active: AtomicUsize::new(0),
                limit,
            }),
        }
    }

    /// Requests admission for one branch.
    ///
    /// Atomically increments the active count; if the post-increment value
    /// is within the limit the branch is admitted and receives a
    /// [`SlotGuard`]. Otherwise the count is rolled back and the branch
    /// must run inline. The count may transiently exceed the limit between
    /// the increment and the rollback.
    #[must_use]
    pub fn admit(&self) -> Admission {
        let active = self.inner.active.fetch_add(1, Ordering::SeqCst) + 1;
        if active <= self.inner.limit {
            Admission::Concurrent(SlotGuard {
                inner: Arc::clone(&self.inner),
            })
        } else {
            self.inner.active.fetch_sub(1, Ordering::SeqCst);
            Admission::Inline
        }
    }

    /// Returns the number of branches currently holding a slot.
    #[must_use]
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Returns the configured admission limit.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.inner.limit
    }
}
