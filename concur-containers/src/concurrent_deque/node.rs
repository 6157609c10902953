//! Node representation, the atomically-swapped link type, and the two
//! terminator sentinels
//!
//! Each node carries three fields accessed through explicit memory
//! ordering: `item`, `prev`, and `next`. The source assumes a tracing
//! collector retains a node for as long as any reference to it survives,
//! including a reference a caller is holding directly (the handle returned
//! by `addFirstX`/`addLastX`). Rust has no such collector, and the
//! traversal-scoped reclamation the rest of this crate uses for the
//! bounded set's skip list (`crossbeam::epoch`, pinned for the duration of
//! a single call) cannot soundly back a reference a caller keeps past the
//! call that produced it. [`AtomicLink`] instead realizes the "tracing
//! collector" assumption directly with atomic reference counting: every
//! `prev`/`next` slot holds a strong `Arc`, so a node is only ever
//! deallocated once its last referent -- a neighbor's link, `head`/`tail`,
//! a live iterator, or a caller's handle -- is dropped.

use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
use std::sync::Arc;

/// A node of the symmetrical doubly-linked list underlying
/// [`ConcurrentDeque`](super::ConcurrentDeque).
///
/// `item` is fixed at construction and never mutated again; `removed` is
/// the single CAS-guarded flag that flips a node from live to logically
/// deleted (it is never set back). `prev`/`next` point either to a real
/// node or to one of the deque's two terminator sentinels (see
/// [`Terminators`]), or are self-linked once the node has been GC-unlinked
/// at the corresponding end.
pub struct Node<T> {
    item: Option<T>,
    removed: AtomicBool,
    pub(crate) prev: AtomicLink<T>,
    pub(crate) next: AtomicLink<T>,
}

impl<T> Node<T> {
    /// Builds a fresh, unlinked node holding `item`.
    pub(crate) fn new(item: T) -> Arc<Self> {
        Arc::new(Self {
            item: Some(item),
            removed: AtomicBool::new(false),
            prev: AtomicLink::null(),
            next: AtomicLink::null(),
        })
    }

    /// Builds a sentinel/placeholder node with no element and both links
    /// null. Used for the initial `head`/`tail` of an empty deque and for
    /// the terminator sentinels.
    pub(crate) fn empty() -> Arc<Self> {
        Arc::new(Self {
            item: None,
            removed: AtomicBool::new(true),
            prev: AtomicLink::null(),
            next: AtomicLink::null(),
        })
    }

    /// `true` if the node's item has not yet been logically deleted.
    pub(crate) fn is_live(&self) -> bool {
        !self.removed.load(Ordering::Acquire)
    }

    /// A cheap clone of the element for read-only contract methods
    /// (`peekFirst`, `contains`, ...). `item` itself is never cleared, so
    /// this only needs to consult `removed`, not race with `take_item`.
    pub(crate) fn item(&self) -> Option<T>
    where
        T: Clone,
    {
        if self.is_live() {
            self.item.clone()
        } else {
            None
        }
    }

    /// Attempts to take the element, logically deleting the node, via a
    /// single CAS on `removed` -- the linearization point for
    /// `pollFirst`/`pollLast`/`removeFirstOccurrence`/`unlink`. Returns
    /// `Some(item)` exactly the first time this is called on a given node
    /// and `None` on every call thereafter.
    pub(crate) fn take_item(&self) -> Option<T>
    where
        T: Clone,
    {
        match self
            .removed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => self.item.clone(),
            Err(_) => None,
        }
    }
}

/// An atomically-swapped strong reference to a neighboring node.
///
/// Internally a raw pointer produced by [`Arc::into_raw`]; every successful
/// `store`/`compare_exchange` consumes exactly one strong count and every
/// `load` hands back a freshly incremented clone, so callers never see a
/// dangling reference regardless of how long they hold onto it.
pub(crate) struct AtomicLink<T>(AtomicPtr<Node<T>>);

impl<T> AtomicLink<T> {
    pub(crate) fn null() -> Self {
        Self(AtomicPtr::new(ptr::null_mut()))
    }

    /// Loads a strong reference to the current target, or `None` if the
    /// link has never been set.
    pub(crate) fn load(&self, order: Ordering) -> Option<Arc<Node<T>>> {
        let raw = self.0.load(order);
        Self::clone_raw(raw)
    }

    /// Stores `target`, dropping the strong count previously held here.
    pub(crate) fn store(&self, target: Arc<Node<T>>, order: Ordering) {
        let new = Arc::into_raw(target) as *mut Node<T>;
        let old = self.0.swap(new, order);
        Self::drop_raw(old);
    }

    /// Clears the link, dropping the strong count previously held here,
    /// without installing a new target.
    pub(crate) fn clear(&self, order: Ordering) {
        let old = self.0.swap(ptr::null_mut(), order);
        Self::drop_raw(old);
    }

    /// Compare-and-swap keyed on node identity (pointer equality), mirroring
    /// the source's `casNext`/`casPrev`. `current` is compared against the
    /// value installed by a prior `load` (`None` means "currently null");
    /// `new` is consumed only on success, and handed back untouched on
    /// failure so the caller can retry or drop it.
    pub(crate) fn compare_exchange(
        &self,
        current: Option<&Arc<Node<T>>>,
        new: Arc<Node<T>>,
        success: Ordering,
        failure: Ordering,
    ) -> Result<(), Arc<Node<T>>> {
        let current_ptr = current
            .map(|a| Arc::as_ptr(a) as *mut Node<T>)
            .unwrap_or(ptr::null_mut());
        let new_ptr = Arc::into_raw(new) as *mut Node<T>;
        match self
            .0
            .compare_exchange(current_ptr, new_ptr, success, failure)
        {
            Ok(old) => {
                Self::drop_raw(old);
                Ok(())
            }
            // SAFETY: `new_ptr` was produced by `Arc::into_raw` above and
            // the CAS did not consume it, so reclaiming it here is sound
            // and the count balances back to what the caller passed in.
            Err(_) => Err(unsafe { Arc::from_raw(new_ptr) }),
        }
    }

    fn clone_raw(raw: *mut Node<T>) -> Option<Arc<Node<T>>> {
        if raw.is_null() {
            return None;
        }
        // SAFETY: every non-null value ever stored in an `AtomicLink` was
        // produced by `Arc::into_raw`, and its strong count is only ever
        // released by `store`/`clear`/`compare_exchange` replacing this
        // exact pointer value, so the pointee is alive for this call.
        let borrowed = unsafe { Arc::from_raw(raw) };
        let cloned = borrowed.clone();
        std::mem::forget(borrowed);
        Some(cloned)
    }

    fn drop_raw(raw: *mut Node<T>) {
        if !raw.is_null() {
            drop(unsafe { Arc::from_raw(raw) });
        }
    }
}

impl<T> Drop for AtomicLink<T> {
    fn drop(&mut self) {
        Self::drop_raw(*self.0.get_mut());
    }
}

/// Pointer-identity comparison between two node references, used wherever
/// the source compares node identity (`p == q`, `p.prev == p`, ...).
pub(crate) fn same_node<T>(a: &Arc<Node<T>>, b: &Arc<Node<T>>) -> bool {
    Arc::ptr_eq(a, b)
}

/// The deque's two terminator sentinels: `prev_terminator` marks "off the
/// list at the head end" and has its own `next` self-linked; `next_terminator`
/// marks "off the list at the tail end" and has its own `prev` self-linked.
/// Neither is ever live or reachable from `head`/`tail`.
///
/// The source keeps these as two process-wide static singletons, which
/// Rust cannot express directly: a static would have to be generic over
/// `T`, and statics cannot be parameterized over arbitrary element types.
/// Each `ConcurrentDeque<T>` instead owns one immutable pair, built once in
/// its constructor before any real node exists -- preserving the property
/// the source actually relies on, that the terminators are fixed for the
/// deque's lifetime and never confusable with a live node. Each sentinel's
/// self-link is a deliberate `Arc` reference cycle and is never reclaimed,
/// matching its role as a permanent fixture of the deque.
pub(crate) struct Terminators<T> {
    pub(crate) prev_terminator: Arc<Node<T>>,
    pub(crate) next_terminator: Arc<Node<T>>,
}

impl<T> Terminators<T> {
    pub(crate) fn new() -> Self {
        let prev_terminator = Node::empty();
        prev_terminator
            .next
            .store(prev_terminator.clone(), Ordering::Relaxed);

        let next_terminator = Node::empty();
        next_terminator
            .prev
            .store(next_terminator.clone(), Ordering::Relaxed);

        Self {
            prev_terminator,
            next_terminator,
        }
    }
}
