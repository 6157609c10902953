//! A bounded, concurrent ordered set.
//!
//! [`BoundedOrderedSet`] wraps a lock-free skip list ([`ConcurrentSkipSet`])
//! with a maintained count and a capacity, evicting the smallest element(s)
//! whenever an insertion would push it over capacity. It does not support
//! removal by equality; the only ways an element leaves the set are
//! capacity-driven eviction or consuming `self`.

mod skiplist;

use crate::config::BoundedSetConfig;
use concur_core::{AtomicCounter, Error, Result};
use log::debug;
use skiplist::ConcurrentSkipSet;

/// A concurrent ordered set with a fixed maximum size.
///
/// Insertion never blocks on capacity: once the set holds `max` elements,
/// each further successful insertion evicts the current smallest element
/// (by the element's `Ord` impl) to make room, rather than rejecting the
/// new one. There is no pluggable comparator; elements order by `Ord`.
pub struct BoundedOrderedSet<T> {
    set: ConcurrentSkipSet<T>,
    cnt: AtomicCounter,
    max: usize,
}

impl<T: Ord + Clone> BoundedOrderedSet<T> {
    /// Creates an empty set with the given configuration.
    pub fn new(config: BoundedSetConfig) -> Self {
        Self {
            set: ConcurrentSkipSet::new(),
            cnt: AtomicCounter::new(),
            max: config.max,
        }
    }

    /// Creates a set with the given configuration, then inserts every
    /// element of `items` in iteration order via [`add`](Self::add) —
    /// equivalent to `new` followed by a loop, provided as a convenience
    /// for constructing a pre-populated set in one call. Capacity-driven
    /// eviction applies exactly as it would for the equivalent sequence of
    /// individual `add` calls.
    pub fn with_items<I: IntoIterator<Item = T>>(config: BoundedSetConfig, items: I) -> Self {
        let set = Self::new(config);
        for item in items {
            set.add(item);
        }
        set
    }

    /// Inserts `item`. Returns `true` if it was newly added (and may have
    /// evicted the current smallest element to make room), `false` if an
    /// equal element was already present, in which case nothing changes
    /// and no eviction happens.
    pub fn add(&self, item: T) -> bool {
        if !self.set.insert(item) {
            return false;
        }
        self.cnt.increment();
        loop {
            if self.cnt.get() as usize <= self.max {
                break;
            }
            let before = self.cnt.cas_decrement();
            if before as usize <= self.max {
                // Another evictor already brought the count back down
                // between our check and our decrement; undo ours.
                self.cnt.increment();
                break;
            }
            if let Some(evicted) = self.set.remove_first() {
                debug!("BoundedOrderedSet evicted smallest element (max = {})", self.max);
                let _ = evicted;
            }
        }
        true
    }

    /// `true` if an element equal to `item` is present.
    pub fn contains(&self, item: &T) -> bool {
        self.set.contains(item)
    }

    /// Returns a clone of the smallest element, or `None` if empty.
    pub fn first(&self) -> Option<T> {
        self.set.first()
    }

    /// Removal by equality is not supported: the set only shrinks via
    /// capacity-driven eviction of its smallest element. Always returns
    /// [`Error::NotSupported`].
    pub fn remove(&self, _item: &T) -> Result<bool> {
        Err(Error::NotSupported(
            "BoundedOrderedSet does not support removal by equality; only capacity-driven eviction",
        ))
    }

    /// The approximate number of elements currently held.
    pub fn len(&self) -> usize {
        self.cnt.get().max(0) as usize
    }

    /// `true` if the set currently holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The configured maximum size.
    pub fn capacity(&self) -> usize {
        self.max
    }

    /// Collects every live element in ascending order. Weakly consistent,
    /// like the deque's iterators: it reflects some, not necessarily all,
    /// concurrent mutation.
    pub fn to_vec(&self) -> Vec<T> {
        self.set.iter_collect()
    }

    /// A snapshot, ascending iterator.
    pub fn iter(&self) -> std::vec::IntoIter<T> {
        self.to_vec().into_iter()
    }
}

impl<T: Ord + Clone> std::fmt::Debug for BoundedOrderedSet<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedOrderedSet")
            .field("len", &self.len())
            .field("capacity", &self.max)
            .field("elements", &self.to_vec())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rejects_duplicate() {
        let s: BoundedOrderedSet<i32> = BoundedOrderedSet::new(BoundedSetConfig::new(10));
        assert!(s.add(1));
        assert!(!s.add(1));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn add_evicts_smallest_over_capacity() {
        let s: BoundedOrderedSet<i32> = BoundedOrderedSet::new(BoundedSetConfig::new(3));
        for x in [5, 3, 8, 1, 9] {
            s.add(x);
        }
        assert_eq!(s.len(), 3);
        assert_eq!(s.to_vec(), vec![5, 8, 9]);
    }

    #[test]
    fn remove_is_not_supported() {
        let s: BoundedOrderedSet<i32> = BoundedOrderedSet::new(BoundedSetConfig::new(3));
        s.add(1);
        assert_eq!(s.remove(&1), Err(Error::NotSupported("BoundedOrderedSet does not support removal by equality; only capacity-driven eviction")));
        assert!(s.contains(&1));
    }

    #[test]
    fn with_items_matches_sequential_add() {
        let s = BoundedOrderedSet::with_items(BoundedSetConfig::new(3), [5, 3, 8, 1, 9]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.to_vec(), vec![5, 8, 9]);
    }

    #[test]
    fn first_is_smallest() {
        let s: BoundedOrderedSet<i32> = BoundedOrderedSet::new(BoundedSetConfig::new(5));
        for x in [4, 2, 7] {
            s.add(x);
        }
        assert_eq!(s.first(), Some(2));
    }
}
