//! Weakly-consistent iterators over a [`ConcurrentDeque`].
//!
//! Neither iterator blocks concurrent writers and neither takes a
//! snapshot: each step reads whatever the structure looks like at that
//! instant. An iterator never yields the same live element twice and never
//! yields a node unlinked before the iterator reached it, but it may miss
//! elements inserted behind its current position after iteration started,
//! or observe elements removed concurrently as simply absent.

use super::node::Node;
use super::ConcurrentDeque;
use concur_core::{Error, Result};
use std::sync::Arc;

/// A forward (first-to-last) iterator, returned by
/// [`ConcurrentDeque::iter`](super::ConcurrentDeque::iter).
pub struct Iter<'a, T> {
    deque: &'a ConcurrentDeque<T>,
    node: Option<Arc<Node<T>>>,
    last_returned: Option<Arc<Node<T>>>,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(deque: &'a ConcurrentDeque<T>) -> Self {
        Self {
            node: Some(deque.first()),
            deque,
            last_returned: None,
        }
    }

    /// Removes the element most recently returned by `next`. Errors with
    /// [`Error::NotSupported`] if called before the first `next()` call or
    /// more than once per element.
    pub fn remove(&mut self) -> Result<()>
    where
        T: Clone,
    {
        match self.last_returned.take() {
            Some(node) => {
                if node.take_item().is_some() {
                    self.deque.unlink_dead(&node);
                }
                Ok(())
            }
            None => Err(Error::NotSupported(
                "iterator remove called before next or twice for the same element",
            )),
        }
    }
}

impl<'a, T: Clone> Iterator for Iter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while let Some(p) = self.node.take() {
            let item = p.item();
            self.node = self.deque.succ(&p);
            if item.is_some() {
                self.last_returned = Some(p);
                return item;
            }
        }
        None
    }
}

/// A backward (last-to-first) iterator, returned by
/// [`ConcurrentDeque::descending_iter`](super::ConcurrentDeque::descending_iter).
pub struct DescendingIter<'a, T> {
    deque: &'a ConcurrentDeque<T>,
    node: Option<Arc<Node<T>>>,
    last_returned: Option<Arc<Node<T>>>,
}

impl<'a, T> DescendingIter<'a, T> {
    pub(super) fn new(deque: &'a ConcurrentDeque<T>) -> Self {
        Self {
            node: Some(deque.last()),
            deque,
            last_returned: None,
        }
    }

    /// Removes the element most recently returned by `next`. See
    /// [`Iter::remove`].
    pub fn remove(&mut self) -> Result<()>
    where
        T: Clone,
    {
        match self.last_returned.take() {
            Some(node) => {
                if node.take_item().is_some() {
                    self.deque.unlink_dead(&node);
                }
                Ok(())
            }
            None => Err(Error::NotSupported(
                "iterator remove called before next or twice for the same element",
            )),
        }
    }
}

impl<'a, T: Clone> Iterator for DescendingIter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while let Some(p) = self.node.take() {
            let item = p.item();
            self.node = self.deque.pred(&p);
            if item.is_some() {
                self.last_returned = Some(p);
                return item;
            }
        }
        None
    }
}
