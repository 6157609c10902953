//! Shared primitives used by both concurrent containers
//!
//! This module contains the small pieces of state that the deque and the
//! bounded set each need but that are not specific to either: an atomic
//! counter with the saturating semantics the deque's `size()` requires, and
//! a helper for the traversal-count cap both containers document.

use std::sync::atomic::{AtomicIsize, Ordering};

/// An atomic counter tracking a container's element count by logical
/// insert/remove events rather than by traversal.
///
/// Both `ConcurrentDeque::size` and `BoundedOrderedSet::cnt` are this type:
/// an approximate, eventually-consistent view of cardinality that is cheap
/// to read and update from any thread.
#[derive(Debug, Default)]
pub struct AtomicCounter {
    value: AtomicIsize,
}

impl AtomicCounter {
    /// Creates a new counter starting at zero.
    #[inline]
    pub const fn new() -> Self {
        Self {
            value: AtomicIsize::new(0),
        }
    }

    /// Returns the current value. Approximate under concurrency.
    #[inline]
    pub fn get(&self) -> isize {
        self.value.load(Ordering::Relaxed)
    }

    /// Adds `delta` (may be negative) and returns the resulting value.
    #[inline]
    pub fn add(&self, delta: isize) -> isize {
        self.value.fetch_add(delta, Ordering::Relaxed) + delta
    }

    /// Increments by one.
    #[inline]
    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrements by one.
    #[inline]
    pub fn decrement(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    /// Repeatedly attempts `current -> current - 1` via compare-and-swap,
    /// retrying on spurious interleavings, and returns the value it
    /// decremented from. The bounded set decrements before evicting so that
    /// concurrent inserters observe the lowered count promptly.
    #[inline]
    pub fn cas_decrement(&self) -> isize {
        loop {
            let current = self.value.load(Ordering::Relaxed);
            if self
                .value
                .compare_exchange_weak(current, current - 1, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                return current;
            }
        }
    }

    /// Returns the count saturated to the range of a 32-bit signed integer,
    /// matching the container's documented `size()` cap.
    #[inline]
    pub fn saturating_i32(&self) -> i32 {
        self.get().clamp(i32::MIN as isize, i32::MAX as isize) as i32
    }
}

/// Caps a running traversal count at `i32::MAX`, matching the deque's
/// documented `size()` behavior under very large batches rather than
/// allowing silent wraparound.
#[inline]
pub fn saturating_count(count: usize) -> i32 {
    if count > i32::MAX as usize {
        i32::MAX
    } else {
        count as i32
    }
}
