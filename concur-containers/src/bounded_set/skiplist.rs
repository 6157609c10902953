//! Lock-free skip list implementation underlying [`super::BoundedOrderedSet`]
//!
//! This module implements a concurrent skip list that supports:
//! - Lock-free reads using epoch-based memory reclamation
//! - Concurrent inserts with CAS-based level linking
//! - O(1) removal of the lowest element, the operation the bounded set's
//!   eviction loop and its ascending iteration actually need

use crossbeam::epoch::{self, Atomic, Guard, Owned, Shared};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering as CmpOrdering;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

/// Maximum height of the skip list (affects memory usage and performance)
const MAX_HEIGHT: usize = 12;

/// Probability factor for determining node height (1/4 chance of increasing height)
const BRANCHING_FACTOR: u32 = 4;

/// A node in the skip list
struct Node<T> {
    /// `None` only for the sentinel head node, which never carries an
    /// element and always compares less than every real key.
    key: Option<T>,
    /// Set once a node is logically removed so a concurrent reader mid-walk
    /// doesn't return it a second time. Physical unlinking still happens
    /// via CAS on `next`.
    removed: std::sync::atomic::AtomicBool,
    /// Next pointers for each level (height determines the vector length)
    next: Vec<Atomic<Node<T>>>,
}

impl<T> Node<T> {
    fn new(key: T, height: usize) -> Self {
        let mut next = Vec::with_capacity(height);
        for _ in 0..height {
            next.push(Atomic::null());
        }
        Self {
            key: Some(key),
            removed: std::sync::atomic::AtomicBool::new(false),
            next,
        }
    }

    fn head(height: usize) -> Self {
        let mut next = Vec::with_capacity(height);
        for _ in 0..height {
            next.push(Atomic::null());
        }
        Self {
            key: None,
            removed: std::sync::atomic::AtomicBool::new(false),
            next,
        }
    }

    fn is_removed(&self) -> bool {
        self.removed.load(AtomicOrdering::Acquire)
    }
}

/// A concurrent, lock-free ordered set of `T`, backing
/// [`super::BoundedOrderedSet`].
///
/// # Thread Safety
///
/// Multiple threads can read concurrently without locking. Writes use
/// CAS-based linking to allow concurrent modification of different parts of
/// the list.
///
/// # Memory Management
///
/// Uses crossbeam's epoch-based memory reclamation to safely free nodes
/// that are no longer reachable, avoiding the ABA problem.
pub(crate) struct ConcurrentSkipSet<T> {
    head: Atomic<Node<T>>,
    height: AtomicUsize,
    len: AtomicUsize,
    rng: Mutex<rand::rngs::StdRng>,
}

impl<T: Ord + Clone> ConcurrentSkipSet<T> {
    pub(crate) fn new() -> Self {
        let head = Node::head(MAX_HEIGHT);
        Self {
            head: Atomic::new(head),
            height: AtomicUsize::new(1),
            len: AtomicUsize::new(0),
            rng: Mutex::new(rand::rngs::StdRng::from_entropy()),
        }
    }

    fn random_height(&self) -> usize {
        let mut height = 1;
        let mut rng = self.rng.lock();
        while height < MAX_HEIGHT && rng.gen_ratio(1, BRANCHING_FACTOR) {
            height += 1;
        }
        height
    }

    /// Populates `preds`/`succs` with the predecessor and successor at each
    /// level for `key`. Returns `true` if `key` is already present (in the
    /// successor at level 0) and not logically removed.
    fn find<'g>(
        &self,
        key: &T,
        preds: &mut [Shared<'g, Node<T>>],
        succs: &mut [Shared<'g, Node<T>>],
        guard: &'g Guard,
    ) -> bool {
        let mut pred = self.head.load(AtomicOrdering::Acquire, guard);

        for level in (0..self.height.load(AtomicOrdering::Acquire)).rev() {
            let mut curr = unsafe { pred.as_ref() }.unwrap().next[level].load(AtomicOrdering::Acquire, guard);

            while !curr.is_null() {
                let curr_ref = unsafe { curr.as_ref() }.unwrap();
                match curr_ref.key.as_ref().unwrap().cmp(key) {
                    CmpOrdering::Less => {
                        pred = curr;
                        curr = curr_ref.next[level].load(AtomicOrdering::Acquire, guard);
                    }
                    _ => break,
                }
            }

            if level < preds.len() {
                preds[level] = pred;
                succs[level] = curr;
            }
        }

        !succs[0].is_null() && {
            let s = unsafe { succs[0].as_ref() }.unwrap();
            s.key.as_ref().unwrap() == key && !s.is_removed()
        }
    }

    /// Inserts `key`. Returns `true` if it was newly added, `false` if an
    /// equal element was already present.
    pub(crate) fn insert(&self, key: T) -> bool {
        let guard = &epoch::pin();
        let height = self.random_height();

        loop {
            let current_height = self.height.load(AtomicOrdering::Acquire);
            if height <= current_height {
                break;
            }
            if self
                .height
                .compare_exchange(current_height, height, AtomicOrdering::Release, AtomicOrdering::Acquire)
                .is_ok()
            {
                break;
            }
        }

        let mut preds: Vec<Shared<Node<T>>> = vec![Shared::null(); height.max(1)];
        let mut succs: Vec<Shared<Node<T>>> = vec![Shared::null(); height.max(1)];

        loop {
            if self.find(&key, &mut preds, &mut succs, guard) {
                return false;
            }

            let new_node = Owned::new(Node::new(key_clone_for_retry(&key), height));
            for (i, &succ) in succs.iter().enumerate().take(height) {
                new_node.deref().next[i].store(succ, AtomicOrdering::Relaxed);
            }
            let new_node_shared = new_node.into_shared(guard);

            match unsafe { preds[0].as_ref() }.unwrap().next[0].compare_exchange(
                succs[0],
                new_node_shared,
                AtomicOrdering::Release,
                AtomicOrdering::Acquire,
                guard,
            ) {
                Ok(_) => {
                    for i in 1..height {
                        loop {
                            match unsafe { preds[i].as_ref() }.unwrap().next[i].compare_exchange(
                                succs[i],
                                new_node_shared,
                                AtomicOrdering::Release,
                                AtomicOrdering::Acquire,
                                guard,
                            ) {
                                Ok(_) => break,
                                Err(_) => {
                                    self.find(&key, &mut preds, &mut succs, guard);
                                }
                            }
                        }
                    }
                    self.len.fetch_add(1, AtomicOrdering::Relaxed);
                    return true;
                }
                Err(_) => continue,
            }
        }
    }

    /// `true` if an element equal to `key` is present.
    pub(crate) fn contains(&self, key: &T) -> bool {
        let guard = &epoch::pin();
        let mut preds = vec![Shared::null(); 1];
        let mut succs = vec![Shared::null(); 1];
        self.find(key, &mut preds, &mut succs, guard)
    }

    /// Logically and then physically removes the smallest element, if any.
    pub(crate) fn remove_first(&self) -> Option<T> {
        let guard = &epoch::pin();
        loop {
            let head = self.head.load(AtomicOrdering::Acquire, guard);
            let first = unsafe { head.as_ref() }.unwrap().next[0].load(AtomicOrdering::Acquire, guard);
            if first.is_null() {
                return None;
            }
            let first_ref = unsafe { first.as_ref() }.unwrap();
            if first_ref
                .removed
                .compare_exchange(false, true, AtomicOrdering::AcqRel, AtomicOrdering::Acquire)
                .is_err()
            {
                // Someone else is removing the same node; help unlink, retry.
                self.physically_unlink_head(guard);
                continue;
            }
            let key = first_ref.key.clone();
            self.len.fetch_sub(1, AtomicOrdering::Relaxed);
            self.physically_unlink_head(guard);
            return key;
        }
    }

    /// Unlinks every removed node currently sitting right after `head` at
    /// level 0, bringing the bottom list back in sync with logical state.
    fn physically_unlink_head(&self, guard: &Guard) {
        loop {
            let head = self.head.load(AtomicOrdering::Acquire, guard);
            let head_ref = unsafe { head.as_ref() }.unwrap();
            let first = head_ref.next[0].load(AtomicOrdering::Acquire, guard);
            if first.is_null() {
                return;
            }
            let first_ref = unsafe { first.as_ref() }.unwrap();
            if !first_ref.is_removed() {
                return;
            }
            let next = first_ref.next[0].load(AtomicOrdering::Acquire, guard);
            if head_ref.next[0]
                .compare_exchange(first, next, AtomicOrdering::AcqRel, AtomicOrdering::Acquire, guard)
                .is_ok()
            {
                unsafe { guard.defer_destroy(first) };
            }
        }
    }

    /// Returns a clone of the smallest element without removing it.
    pub(crate) fn first(&self) -> Option<T> {
        let guard = &epoch::pin();
        let head = self.head.load(AtomicOrdering::Acquire, guard);
        let mut curr = unsafe { head.as_ref() }.unwrap().next[0].load(AtomicOrdering::Acquire, guard);
        while !curr.is_null() {
            let curr_ref = unsafe { curr.as_ref() }.unwrap();
            if !curr_ref.is_removed() {
                return curr_ref.key.clone();
            }
            curr = curr_ref.next[0].load(AtomicOrdering::Acquire, guard);
        }
        None
    }

    /// Collects every live element in ascending order. Weakly consistent,
    /// like the deque's iterators.
    pub(crate) fn iter_collect(&self) -> Vec<T> {
        let guard = &epoch::pin();
        let head = self.head.load(AtomicOrdering::Acquire, guard);
        let mut curr = unsafe { head.as_ref() }.unwrap().next[0].load(AtomicOrdering::Acquire, guard);
        let mut out = Vec::new();
        while !curr.is_null() {
            let curr_ref = unsafe { curr.as_ref() }.unwrap();
            if !curr_ref.is_removed() {
                out.push(curr_ref.key.clone().unwrap());
            }
            curr = curr_ref.next[0].load(AtomicOrdering::Acquire, guard);
        }
        out
    }

    /// Approximate count of live elements.
    pub(crate) fn len(&self) -> usize {
        self.len.load(AtomicOrdering::Relaxed)
    }
}

/// `insert`'s retry loop needs a fresh owned key on each attempt but only
/// takes `&T` so the caller can still use `key` for `find` after a failed
/// CAS; cloning here keeps the common, uncontended path (one clone, one
/// CAS) as cheap as the teacher's own `insert`, which clones for the same
/// reason.
fn key_clone_for_retry<T: Clone>(key: &T) -> T {
    key.clone()
}

impl<T> Drop for ConcurrentSkipSet<T> {
    fn drop(&mut self) {
        let guard = &epoch::pin();
        let mut curr = self.head.load(AtomicOrdering::Acquire, guard);
        while !curr.is_null() {
            let next = unsafe { curr.as_ref() }.unwrap().next[0].load(AtomicOrdering::Acquire, guard);
            unsafe { guard.defer_destroy(curr) };
            curr = next;
        }
    }
}
