//! A lock-free, unbounded, concurrent double-ended queue.
//!
//! The algorithms here (`link_last`/`link_first`, end removal, `unlink`,
//! `skip_deleted_successors`/`skip_deleted_predecessors`, the terminator
//! dance in `first`/`last`) all come from the same source as the node
//! representation in [`node`]: a symmetrical doubly-linked list where `head`
//! and `tail` are allowed to lag behind the true ends, and are lazily
//! advanced roughly every other successful hop rather than on every single
//! operation.

mod iter;
mod node;

pub use iter::{DescendingIter, Iter};
pub(crate) use node::Node;
use node::{same_node, AtomicLink, Terminators};

use concur_core::{saturating_count, AtomicCounter, Error, Result};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Number of bypassed (non-live) nodes an interior `unlink` must find on at
/// least one side before it bothers compressing the chain and GC-unlinking
/// the removed node. Below this, the dead node is left in place under the
/// lazy-cleanup policy; it will be swept up the next time a neighboring
/// removal walks past it. Matches the source's small fixed threshold,
/// chosen to keep a single slow remover from doing disproportionate
/// cleanup work on behalf of everyone else.
const HOPS: u32 = 2;

/// An opaque handle to a specific element, returned by the node-returning
/// insertion methods so a caller can later remove that exact element in
/// O(1) via [`ConcurrentDeque::unlink`] without re-searching for it by
/// value, and can hand it to [`ConcurrentDeque::add_first_node`] /
/// [`ConcurrentDeque::add_last_node`] to relink a node built ahead of time.
pub struct DequeNode<T>(Arc<Node<T>>);

impl<T> DequeNode<T> {
    /// Builds a free-standing node holding `item`, not yet part of any
    /// deque.
    pub fn new(item: T) -> Self {
        Self(Node::new(item))
    }
}

impl<T> Clone for DequeNode<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// The element and node handle returned together by the `*_x` polling
/// methods, letting a caller inspect the drained node (e.g. to confirm it
/// is now safely unlinked) without a second lookup.
pub struct Polled<T> {
    pub item: T,
    pub node: DequeNode<T>,
}

/// A lock-free, unbounded, concurrent double-ended queue.
///
/// Supports insertion and removal at both ends in amortized O(1), O(1)
/// removal of a previously-returned node handle, and weakly-consistent
/// iteration in either direction. `size()` is a real traversal count (see
/// the crate-level docs' non-goals on constant-time sizing); `size_approx()`
/// is the O(1) maintained counter instead, approximate under concurrent
/// modification.
pub struct ConcurrentDeque<T> {
    head: AtomicLink<T>,
    tail: AtomicLink<T>,
    size: AtomicCounter,
    terminators: Terminators<T>,
}

impl<T> Default for ConcurrentDeque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConcurrentDeque<T> {
    /// Creates a new, empty deque.
    pub fn new() -> Self {
        let initial = Node::empty();
        let head = AtomicLink::null();
        head.store(initial.clone(), Ordering::Relaxed);
        let tail = AtomicLink::null();
        tail.store(initial, Ordering::Relaxed);
        Self {
            head,
            tail,
            size: AtomicCounter::new(),
            terminators: Terminators::new(),
        }
    }

    fn is_terminator(&self, p: &Arc<Node<T>>) -> bool {
        same_node(p, &self.terminators.prev_terminator) || same_node(p, &self.terminators.next_terminator)
    }

    // ---- end insertion -------------------------------------------------

    /// Inserts `node` (built via [`DequeNode::new`] and not yet linked) at
    /// the front of the deque.
    pub fn add_first_node(&self, node: DequeNode<T>) {
        self.link_first(node.0);
    }

    /// Inserts `node` at the back of the deque.
    pub fn add_last_node(&self, node: DequeNode<T>) {
        self.link_last(node.0);
    }

    /// Equivalent to [`add_first_node`](Self::add_first_node); the deque
    /// never rejects an insertion, so this always returns `true`.
    pub fn offer_first_node(&self, node: DequeNode<T>) -> bool {
        self.add_first_node(node);
        true
    }

    /// Equivalent to [`add_last_node`](Self::add_last_node); always returns
    /// `true`.
    pub fn offer_last_node(&self, node: DequeNode<T>) -> bool {
        self.add_last_node(node);
        true
    }

    /// Prepends `item`.
    pub fn add_first(&self, item: T) {
        self.link_first(Node::new(item));
    }

    /// Appends `item`. Always succeeds (the deque is unbounded), matching
    /// `offer_last`'s return value.
    pub fn add_last(&self, item: T) {
        self.link_last(Node::new(item));
    }

    /// Equivalent to [`add_first`](Self::add_first); the deque never
    /// rejects an insertion, so this always returns `true`.
    pub fn offer_first(&self, item: T) -> bool {
        self.add_first(item);
        true
    }

    /// Equivalent to [`add_last`](Self::add_last); always returns `true`.
    pub fn offer_last(&self, item: T) -> bool {
        self.add_last(item);
        true
    }

    /// Prepends `item` and returns a handle to the new node.
    pub fn add_first_x(&self, item: T) -> DequeNode<T> {
        let node = Node::new(item);
        self.link_first(node.clone());
        DequeNode(node)
    }

    /// Appends `item` and returns a handle to the new node.
    pub fn add_last_x(&self, item: T) -> DequeNode<T> {
        let node = Node::new(item);
        self.link_last(node.clone());
        DequeNode(node)
    }

    /// Equivalent to [`add_first_x`](Self::add_first_x); the deque never
    /// rejects an insertion, so this always succeeds.
    pub fn offer_first_x(&self, item: T) -> DequeNode<T> {
        self.add_first_x(item)
    }

    /// Equivalent to [`add_last_x`](Self::add_last_x); always succeeds.
    pub fn offer_last_x(&self, item: T) -> DequeNode<T> {
        self.add_last_x(item)
    }

    fn link_first(&self, new_node: Arc<Node<T>>) {
        'restart: loop {
            let mut h = self.head.load(Ordering::Acquire).expect("head is always set");
            let mut p = h.clone();
            loop {
                if self.is_terminator(&p) {
                    continue 'restart;
                }
                match p.prev.load(Ordering::Acquire) {
                    Some(q1) => {
                        p = q1;
                        if self.is_terminator(&p) {
                            continue 'restart;
                        }
                        match p.prev.load(Ordering::Acquire) {
                            Some(q2) => {
                                let fresh_h = self.head.load(Ordering::Acquire).unwrap();
                                if !same_node(&h, &fresh_h) {
                                    h = fresh_h.clone();
                                    p = fresh_h;
                                } else {
                                    p = q2;
                                }
                                continue;
                            }
                            None => {}
                        }
                    }
                    None => {}
                }
                new_node.next.store(p.clone(), Ordering::Release);
                match p.prev.compare_exchange(None, new_node.clone(), Ordering::AcqRel, Ordering::Acquire) {
                    Ok(()) => {
                        if !same_node(&p, &h) {
                            let _ = self.head.compare_exchange(Some(&h), new_node.clone(), Ordering::AcqRel, Ordering::Acquire);
                        }
                        self.size.increment();
                        return;
                    }
                    Err(_) => continue,
                }
            }
        }
    }

    fn link_last(&self, new_node: Arc<Node<T>>) {
        'restart: loop {
            let mut t = self.tail.load(Ordering::Acquire).expect("tail is always set");
            let mut p = t.clone();
            loop {
                if self.is_terminator(&p) {
                    continue 'restart;
                }
                match p.next.load(Ordering::Acquire) {
                    Some(q1) => {
                        p = q1;
                        if self.is_terminator(&p) {
                            continue 'restart;
                        }
                        match p.next.load(Ordering::Acquire) {
                            Some(q2) => {
                                let fresh_t = self.tail.load(Ordering::Acquire).unwrap();
                                if !same_node(&t, &fresh_t) {
                                    t = fresh_t.clone();
                                    p = fresh_t;
                                } else {
                                    p = q2;
                                }
                                continue;
                            }
                            None => {}
                        }
                    }
                    None => {}
                }
                new_node.prev.store(p.clone(), Ordering::Release);
                match p.next.compare_exchange(None, new_node.clone(), Ordering::AcqRel, Ordering::Acquire) {
                    Ok(()) => {
                        if !same_node(&p, &t) {
                            let _ = self.tail.compare_exchange(Some(&t), new_node.clone(), Ordering::AcqRel, Ordering::Acquire);
                        }
                        self.size.increment();
                        return;
                    }
                    Err(_) => continue,
                }
            }
        }
    }

    // ---- locating the true ends ----------------------------------------

    fn first(&self) -> Arc<Node<T>> {
        'restart: loop {
            let mut h = self.head.load(Ordering::Acquire).expect("head is always set");
            let mut p = h.clone();
            loop {
                if self.is_terminator(&p) {
                    continue 'restart;
                }
                if let Some(q1) = p.prev.load(Ordering::Acquire) {
                    p = q1;
                    if self.is_terminator(&p) {
                        continue 'restart;
                    }
                    if let Some(q2) = p.prev.load(Ordering::Acquire) {
                        let fresh_h = self.head.load(Ordering::Acquire).unwrap();
                        if !same_node(&h, &fresh_h) {
                            h = fresh_h.clone();
                            p = fresh_h;
                        } else {
                            p = q2;
                        }
                        continue;
                    }
                }
                if same_node(&p, &h) {
                    return p;
                }
                match self.head.compare_exchange(Some(&h), p.clone(), Ordering::AcqRel, Ordering::Acquire) {
                    Ok(()) => return p,
                    Err(_) => continue 'restart,
                }
            }
        }
    }

    fn last(&self) -> Arc<Node<T>> {
        'restart: loop {
            let mut t = self.tail.load(Ordering::Acquire).expect("tail is always set");
            let mut p = t.clone();
            loop {
                if self.is_terminator(&p) {
                    continue 'restart;
                }
                if let Some(q1) = p.next.load(Ordering::Acquire) {
                    p = q1;
                    if self.is_terminator(&p) {
                        continue 'restart;
                    }
                    if let Some(q2) = p.next.load(Ordering::Acquire) {
                        let fresh_t = self.tail.load(Ordering::Acquire).unwrap();
                        if !same_node(&t, &fresh_t) {
                            t = fresh_t.clone();
                            p = fresh_t;
                        } else {
                            p = q2;
                        }
                        continue;
                    }
                }
                if same_node(&p, &t) {
                    return p;
                }
                match self.tail.compare_exchange(Some(&t), p.clone(), Ordering::AcqRel, Ordering::Acquire) {
                    Ok(()) => return p,
                    Err(_) => continue 'restart,
                }
            }
        }
    }

    /// Returns `p`'s successor, restarting from the true first node if `p`
    /// had been bypassed off the tail end by a concurrent unlink. `p` is
    /// bypassed either by landing on a terminator sentinel (a true end
    /// unlink via `unlink_first`/`unlink_last`, or an interior unlink whose
    /// dead run reached an end) or by finding itself self-linked (a pure
    /// interior GC-unlink); both mean `p` is off the list and must restart.
    fn succ(&self, p: &Arc<Node<T>>) -> Option<Arc<Node<T>>> {
        let q = p.next.load(Ordering::Acquire)?;
        if same_node(p, &q) || self.is_terminator(&q) {
            Some(self.first())
        } else {
            Some(q)
        }
    }

    /// Symmetric to [`succ`](Self::succ), walking `prev`.
    fn pred(&self, p: &Arc<Node<T>>) -> Option<Arc<Node<T>>> {
        let q = p.prev.load(Ordering::Acquire)?;
        if same_node(p, &q) || self.is_terminator(&q) {
            Some(self.last())
        } else {
            Some(q)
        }
    }

    // ---- end removal -----------------------------------------------------

    /// Removes and returns the first element, or `None` if the deque is
    /// empty.
    pub fn poll_first(&self) -> Option<T>
    where
        T: Clone,
    {
        let mut p = self.first();
        loop {
            if let Some(item) = p.take_item() {
                self.unlink_dead(&p);
                return Some(item);
            }
            p = self.succ(&p)?;
        }
    }

    /// Removes and returns the last element, or `None` if the deque is
    /// empty.
    pub fn poll_last(&self) -> Option<T>
    where
        T: Clone,
    {
        let mut p = self.last();
        loop {
            if let Some(item) = p.take_item() {
                self.unlink_dead(&p);
                return Some(item);
            }
            p = self.pred(&p)?;
        }
    }

    /// [`poll_first`](Self::poll_first), also returning a handle to the
    /// now-unlinked node.
    pub fn poll_first_x(&self) -> Option<Polled<T>>
    where
        T: Clone,
    {
        let mut p = self.first();
        loop {
            if let Some(item) = p.take_item() {
                self.unlink_dead(&p);
                return Some(Polled { item, node: DequeNode(p) });
            }
            p = self.succ(&p)?;
        }
    }

    /// [`poll_last`](Self::poll_last), also returning a handle to the
    /// now-unlinked node.
    pub fn poll_last_x(&self) -> Option<Polled<T>>
    where
        T: Clone,
    {
        let mut p = self.last();
        loop {
            if let Some(item) = p.take_item() {
                self.unlink_dead(&p);
                return Some(Polled { item, node: DequeNode(p) });
            }
            p = self.pred(&p)?;
        }
    }

    /// Returns a clone of the first element without removing it.
    pub fn peek_first(&self) -> Option<T>
    where
        T: Clone,
    {
        let mut p = self.first();
        loop {
            if let Some(item) = p.item() {
                return Some(item);
            }
            p = self.succ(&p)?;
        }
    }

    /// Returns a clone of the last element without removing it.
    pub fn peek_last(&self) -> Option<T>
    where
        T: Clone,
    {
        let mut p = self.last();
        loop {
            if let Some(item) = p.item() {
                return Some(item);
            }
            p = self.pred(&p)?;
        }
    }

    /// Like [`peek_first`](Self::peek_first) but returns
    /// [`Error::NoSuchElement`] instead of `None` on an empty deque.
    pub fn get_first(&self) -> Result<T>
    where
        T: Clone,
    {
        self.peek_first().ok_or(Error::NoSuchElement)
    }

    /// Like [`peek_last`](Self::peek_last) but returns
    /// [`Error::NoSuchElement`] instead of `None` on an empty deque.
    pub fn get_last(&self) -> Result<T>
    where
        T: Clone,
    {
        self.peek_last().ok_or(Error::NoSuchElement)
    }

    /// Like [`poll_first`](Self::poll_first) but returns
    /// [`Error::NoSuchElement`] instead of `None` on an empty deque.
    pub fn remove_first(&self) -> Result<T>
    where
        T: Clone,
    {
        self.poll_first().ok_or(Error::NoSuchElement)
    }

    /// Like [`poll_last`](Self::poll_last) but returns
    /// [`Error::NoSuchElement`] instead of `None` on an empty deque.
    pub fn remove_last(&self) -> Result<T>
    where
        T: Clone,
    {
        self.poll_last().ok_or(Error::NoSuchElement)
    }

    // ---- search / equality ----------------------------------------------

    /// `true` if any live element equals `item`.
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq + Clone,
    {
        let mut p = self.first();
        loop {
            if let Some(held) = p.item() {
                if &held == item {
                    return true;
                }
            }
            match self.succ(&p) {
                Some(next) => p = next,
                None => return false,
            }
        }
    }

    /// Removes the first (closest to the front) live element equal to
    /// `item`. Returns `true` if one was found and removed.
    pub fn remove_first_occurrence(&self, item: &T) -> bool
    where
        T: PartialEq + Clone,
    {
        let mut p = self.first();
        loop {
            if p.item().as_ref() == Some(item) {
                if p.take_item().is_some() {
                    self.unlink_dead(&p);
                    return true;
                }
                // Raced with another remover; keep scanning forward.
            }
            match self.succ(&p) {
                Some(next) => p = next,
                None => return false,
            }
        }
    }

    /// Removes the last (closest to the back) live element equal to
    /// `item`. Returns `true` if one was found and removed.
    pub fn remove_last_occurrence(&self, item: &T) -> bool
    where
        T: PartialEq + Clone,
    {
        let mut p = self.last();
        loop {
            if p.item().as_ref() == Some(item) {
                if p.take_item().is_some() {
                    self.unlink_dead(&p);
                    return true;
                }
            }
            match self.pred(&p) {
                Some(next) => p = next,
                None => return false,
            }
        }
    }

    /// Alias for [`remove_first_occurrence`](Self::remove_first_occurrence).
    pub fn remove(&self, item: &T) -> bool
    where
        T: PartialEq + Clone,
    {
        self.remove_first_occurrence(item)
    }

    // ---- unlink -----------------------------------------------------------

    /// Marks `node` non-live if it is still live, and unlinks it from the
    /// structure. A no-op if the node was already non-live (already polled
    /// or already unlinked), matching the contract for the handle returned
    /// by `add_first_x`/`add_last_x`.
    pub fn unlink(&self, node: &DequeNode<T>)
    where
        T: Clone,
    {
        if node.0.take_item().is_some() {
            self.unlink_dead(&node.0);
        }
    }

    /// Structural cleanup for a node whose item has already been taken.
    fn unlink_dead(&self, x: &Arc<Node<T>>) {
        self.size.decrement();
        let prev = x.prev.load(Ordering::Acquire);
        let next = x.next.load(Ordering::Acquire);
        match (prev, next) {
            (None, next) => self.unlink_first(x, next),
            (Some(prev), None) => self.unlink_last(x, Some(prev)),
            (Some(prev), Some(next)) => self.unlink_interior(x, prev, next),
        }
    }

    fn unlink_first(&self, x: &Arc<Node<T>>, next: Option<Arc<Node<T>>>) {
        let mut cursor = next;
        loop {
            match cursor {
                None => break,
                Some(node) => {
                    if self.is_terminator(&node) || node.is_live() {
                        node.prev.clear(Ordering::Release);
                        break;
                    }
                    cursor = node.next.load(Ordering::Acquire);
                }
            }
        }
        x.prev.store(self.terminators.prev_terminator.clone(), Ordering::Release);
        self.first();
    }

    fn unlink_last(&self, x: &Arc<Node<T>>, prev: Option<Arc<Node<T>>>) {
        let mut cursor = prev;
        loop {
            match cursor {
                None => break,
                Some(node) => {
                    if self.is_terminator(&node) || node.is_live() {
                        node.next.clear(Ordering::Release);
                        break;
                    }
                    cursor = node.prev.load(Ordering::Acquire);
                }
            }
        }
        x.next.store(self.terminators.next_terminator.clone(), Ordering::Release);
        self.last();
    }

    fn unlink_interior(&self, x: &Arc<Node<T>>, prev0: Arc<Node<T>>, next0: Arc<Node<T>>) {
        let mut prev = prev0;
        let mut is_first = false;
        let mut hops = 0u32;
        while !prev.is_live() && !self.is_terminator(&prev) {
            match prev.prev.load(Ordering::Acquire) {
                Some(p) => {
                    prev = p;
                    hops += 1;
                }
                None => {
                    is_first = true;
                    break;
                }
            }
        }
        if self.is_terminator(&prev) {
            is_first = true;
        }

        let mut next = next0;
        let mut is_last = false;
        while !next.is_live() && !self.is_terminator(&next) {
            match next.next.load(Ordering::Acquire) {
                Some(n) => {
                    next = n;
                    hops += 1;
                }
                None => {
                    is_last = true;
                    break;
                }
            }
        }
        if self.is_terminator(&next) {
            is_last = true;
        }

        if hops < HOPS && (is_first || is_last) {
            // Shallow interior garbage at an end; leave it for the next
            // removal that walks past it rather than paying for a CAS now.
            return;
        }

        self.skip_deleted_successors(&prev);
        self.skip_deleted_predecessors(&next);

        if is_first || is_last {
            let prev_mark = if is_first {
                self.terminators.prev_terminator.clone()
            } else {
                x.clone()
            };
            let next_mark = if is_last {
                self.terminators.next_terminator.clone()
            } else {
                x.clone()
            };
            x.prev.store(prev_mark, Ordering::Release);
            x.next.store(next_mark, Ordering::Release);
            if is_first {
                self.first();
            }
            if is_last {
                self.last();
            }
        }
    }

    fn skip_deleted_successors(&self, p: &Arc<Node<T>>) {
        loop {
            let Some(q) = p.next.load(Ordering::Acquire) else { return };
            if self.is_terminator(&q) || q.is_live() {
                return;
            }
            let Some(q_next) = q.next.load(Ordering::Acquire) else { return };
            if same_node(&q, &q_next) {
                return;
            }
            if p.next.compare_exchange(Some(&q), q_next, Ordering::AcqRel, Ordering::Acquire).is_err() {
                return;
            }
        }
    }

    fn skip_deleted_predecessors(&self, p: &Arc<Node<T>>) {
        loop {
            let Some(q) = p.prev.load(Ordering::Acquire) else { return };
            if self.is_terminator(&q) || q.is_live() {
                return;
            }
            let Some(q_prev) = q.prev.load(Ordering::Acquire) else { return };
            if same_node(&q, &q_prev) {
                return;
            }
            if p.prev.compare_exchange(Some(&q), q_prev, Ordering::AcqRel, Ordering::Acquire).is_err() {
                return;
            }
        }
    }

    // ---- bulk / whole-container operations ------------------------------

    /// Appends every item from `iter`, in order, splicing them in as a
    /// single private chain linked against the current tail with one CAS.
    /// Returns `false` without touching the deque if `iter` yields nothing.
    ///
    /// Concurrent bulk operations are not atomic as a whole (per the
    /// crate's non-goals): a concurrent reader can observe some but not all
    /// of the appended elements while this call is in progress.
    pub fn add_all<I: IntoIterator<Item = T>>(&self, iter: I) -> bool {
        let nodes: Vec<Arc<Node<T>>> = iter.into_iter().map(Node::new).collect();
        let Some(chain_head) = nodes.first().cloned() else {
            return false;
        };
        let chain_tail = nodes.last().unwrap().clone();
        for pair in nodes.windows(2) {
            pair[0].next.store(pair[1].clone(), Ordering::Relaxed);
            pair[1].prev.store(pair[0].clone(), Ordering::Relaxed);
        }
        self.size.add(nodes.len() as isize);

        'restart: loop {
            let t = self.tail.load(Ordering::Acquire).expect("tail is always set");
            let mut p = t.clone();
            loop {
                if self.is_terminator(&p) {
                    continue 'restart;
                }
                match p.next.load(Ordering::Acquire) {
                    Some(q) => p = q,
                    None => break,
                }
            }
            chain_head.prev.store(p.clone(), Ordering::Release);
            match p.next.compare_exchange(None, chain_head.clone(), Ordering::AcqRel, Ordering::Acquire) {
                Ok(()) => {
                    let _ = self.tail.compare_exchange(Some(&t), chain_tail.clone(), Ordering::AcqRel, Ordering::Acquire);
                    return true;
                }
                Err(_) => continue,
            }
        }
    }

    /// Removes every element.
    pub fn clear(&self)
    where
        T: Clone,
    {
        while self.poll_first().is_some() {}
    }

    /// Copies every live element, front to back, into a `Vec`.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().collect()
    }

    /// `true` if there is no live element at the front, i.e. equivalent to
    /// (but cheaper than) `peek_first().is_none()`: it stops at the first
    /// live node found during structural repair instead of cloning it out.
    pub fn is_empty(&self) -> bool {
        !self.first().is_live()
    }

    /// The live element count, found by a full front-to-back traversal and
    /// saturated to a 32-bit signed range. `O(n)`; reflects a real count at
    /// no single instant under concurrent modification, only a count that
    /// was true at some point during the traversal.
    pub fn size(&self) -> i32 {
        let mut count: usize = 0;
        let mut p = self.first();
        loop {
            if p.is_live() {
                count += 1;
            }
            match self.succ(&p) {
                Some(next) => p = next,
                None => break,
            }
        }
        saturating_count(count)
    }

    /// The maintained counter's current value, saturated to a 32-bit signed
    /// range. `O(1)`, but only approximate under concurrent modification
    /// (see the non-goals): prefer this over [`size`](Self::size) whenever
    /// an exact count isn't required.
    pub fn size_approx(&self) -> i32 {
        self.size.saturating_i32().max(0)
    }

    /// A forward (first-to-last), weakly-consistent iterator.
    pub fn iter(&self) -> Iter<'_, T>
    where
        T: Clone,
    {
        Iter::new(self)
    }

    /// A backward (last-to-first), weakly-consistent iterator.
    pub fn descending_iter(&self) -> DescendingIter<'_, T>
    where
        T: Clone,
    {
        DescendingIter::new(self)
    }
}

impl<T> std::fmt::Debug for ConcurrentDeque<T>
where
    T: std::fmt::Debug + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentDeque")
            .field("size_approx", &self.size_approx())
            .field("elements", &self.to_vec())
            .finish()
    }
}

impl<'a, T: Clone> IntoIterator for &'a ConcurrentDeque<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Draining, owned iteration via repeated `poll_first`.
pub struct IntoIter<T>(ConcurrentDeque<T>);

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;
    fn next(&mut self) -> Option<T> {
        self.0.poll_first()
    }
}

impl<T: Clone> IntoIterator for ConcurrentDeque<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl<T> FromIterator<T> for ConcurrentDeque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let deque = Self::new();
        deque.add_all(iter);
        deque
    }
}

impl<T> Extend<T> for ConcurrentDeque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_front_back() {
        let d: ConcurrentDeque<i32> = ConcurrentDeque::new();
        d.add_last(1);
        d.add_last(2);
        d.add_first(0);
        assert_eq!(d.size(), 3);
        assert_eq!(d.poll_first(), Some(0));
        assert_eq!(d.poll_last(), Some(2));
        assert_eq!(d.poll_first(), Some(1));
        assert_eq!(d.poll_first(), None);
        assert!(d.is_empty());
    }

    #[test]
    fn peek_does_not_remove() {
        let d: ConcurrentDeque<&str> = ConcurrentDeque::new();
        d.add_last("a");
        d.add_last("b");
        assert_eq!(d.peek_first(), Some("a"));
        assert_eq!(d.peek_last(), Some("b"));
        assert_eq!(d.size(), 2);
    }

    #[test]
    fn node_handle_unlink() {
        let d: ConcurrentDeque<i32> = ConcurrentDeque::new();
        d.add_last(1);
        let handle = d.add_last_x(2);
        d.add_last(3);
        assert_eq!(d.size(), 3);
        d.unlink(&handle);
        assert_eq!(d.size(), 2);
        d.unlink(&handle); // no-op, already unlinked
        assert_eq!(d.size(), 2);
        assert_eq!(d.to_vec(), vec![1, 3]);
    }

    #[test]
    fn contains_and_remove_occurrence() {
        let d: ConcurrentDeque<i32> = ConcurrentDeque::new();
        for x in [1, 2, 3, 2] {
            d.add_last(x);
        }
        assert!(d.contains(&2));
        assert!(d.remove_first_occurrence(&2));
        assert_eq!(d.to_vec(), vec![1, 3, 2]);
        assert!(d.remove_last_occurrence(&2));
        assert_eq!(d.to_vec(), vec![1, 3]);
        assert!(!d.remove_first_occurrence(&99));
    }

    #[test]
    fn offer_variants_always_succeed() {
        let d: ConcurrentDeque<i32> = ConcurrentDeque::new();
        assert!(d.offer_first(1));
        assert!(d.offer_last(2));
        let front = d.offer_first_x(0);
        let back = d.offer_last_x(3);
        assert_eq!(d.to_vec(), vec![0, 1, 2, 3]);
        d.unlink(&front);
        d.unlink(&back);
        assert_eq!(d.to_vec(), vec![1, 2]);

        assert!(d.offer_first_node(DequeNode::new(-1)));
        assert!(d.offer_last_node(DequeNode::new(99)));
        assert_eq!(d.to_vec(), vec![-1, 1, 2, 99]);
    }

    #[test]
    fn size_is_a_real_traversal_count_distinct_from_size_approx() {
        let d: ConcurrentDeque<i32> = ConcurrentDeque::new();
        let middle = d.add_last_x(1);
        d.add_last(2);
        d.add_last(3);
        // Logically remove without physically unlinking yet, by taking the
        // item directly: size() must not count it, size_approx() may lag.
        d.unlink(&middle);
        assert_eq!(d.size(), 2);
        assert_eq!(d.to_vec(), vec![2, 3]);
    }

    #[test]
    fn add_all_splices_in_order() {
        let d: ConcurrentDeque<i32> = ConcurrentDeque::new();
        d.add_last(0);
        assert!(d.add_all(vec![1, 2, 3]));
        assert_eq!(d.to_vec(), vec![0, 1, 2, 3]);
        assert!(!d.add_all(Vec::<i32>::new()));
    }

    #[test]
    fn strict_accessors_error_on_empty() {
        let d: ConcurrentDeque<i32> = ConcurrentDeque::new();
        assert_eq!(d.remove_first(), Err(Error::NoSuchElement));
        assert_eq!(d.get_last(), Err(Error::NoSuchElement));
    }

    #[test]
    fn iterator_yields_front_to_back_and_removes() {
        let d: ConcurrentDeque<i32> = ConcurrentDeque::new();
        for x in 0..5 {
            d.add_last(x);
        }
        let collected: Vec<i32> = d.iter().collect();
        assert_eq!(collected, vec![0, 1, 2, 3, 4]);

        let mut it = d.iter();
        assert_eq!(it.next(), Some(0));
        it.remove().unwrap();
        drop(it);
        assert_eq!(d.to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn descending_iterator_yields_back_to_front() {
        let d: ConcurrentDeque<i32> = ConcurrentDeque::new();
        for x in 0..4 {
            d.add_last(x);
        }
        let collected: Vec<i32> = d.descending_iter().collect();
        assert_eq!(collected, vec![3, 2, 1, 0]);
    }

    #[test]
    fn from_iterator_and_extend() {
        let d: ConcurrentDeque<i32> = (0..3).collect();
        assert_eq!(d.to_vec(), vec![0, 1, 2]);
        let mut d = d;
        d.extend(vec![3, 4]);
        assert_eq!(d.to_vec(), vec![0, 1, 2, 3, 4]);
    }
}
