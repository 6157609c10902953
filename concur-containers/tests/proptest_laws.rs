//! Sequential round-trip laws checked against many random input sequences.

use concur_containers::{BoundedOrderedSet, BoundedSetConfig, ConcurrentDeque};
use proptest::prelude::*;
use std::collections::VecDeque;

proptest! {
    /// Pushing a sequence to the back and draining from the front returns
    /// it unchanged, matching a plain `VecDeque` used as the model.
    #[test]
    fn fifo_matches_vecdeque_model(xs in proptest::collection::vec(any::<i32>(), 0..200)) {
        let deque = ConcurrentDeque::new();
        let mut model: VecDeque<i32> = VecDeque::new();
        for &x in &xs {
            deque.add_last(x);
            model.push_back(x);
        }
        let mut drained = Vec::new();
        while let Some(x) = deque.poll_first() {
            drained.push(x);
        }
        prop_assert_eq!(drained, model.into_iter().collect::<Vec<_>>());
    }

    /// Pushing to the front and draining from the front yields the
    /// sequence in reverse, matching repeated `push_front`.
    #[test]
    fn lifo_via_front_matches_model(xs in proptest::collection::vec(any::<i32>(), 0..200)) {
        let deque = ConcurrentDeque::new();
        for &x in &xs {
            deque.add_first(x);
        }
        let drained: Vec<i32> = std::iter::from_fn(|| deque.poll_first()).collect();
        let expected: Vec<i32> = xs.into_iter().rev().collect();
        prop_assert_eq!(drained, expected);
    }

    /// `add_all` followed by draining yields the same elements, in order,
    /// as pushing them one at a time.
    #[test]
    fn add_all_matches_sequential_add_last(xs in proptest::collection::vec(any::<i32>(), 0..200)) {
        let via_bulk = ConcurrentDeque::new();
        via_bulk.add_all(xs.clone());

        let via_sequential = ConcurrentDeque::new();
        for &x in &xs {
            via_sequential.add_last(x);
        }

        prop_assert_eq!(via_bulk.to_vec(), via_sequential.to_vec());
    }

    /// A bounded set's size never exceeds its configured capacity and
    /// always stays sorted ascending, for any insertion sequence.
    #[test]
    fn bounded_set_stays_within_capacity_and_sorted(
        xs in proptest::collection::vec(any::<i32>(), 0..300),
        capacity in 1usize..50,
    ) {
        let set = BoundedOrderedSet::new(BoundedSetConfig::new(capacity));
        for x in xs {
            set.add(x);
        }
        prop_assert!(set.len() <= capacity);
        let elements = set.to_vec();
        prop_assert!(elements.windows(2).all(|w| w[0] < w[1]));
    }

    /// Re-adding an element already present never changes the set.
    #[test]
    fn bounded_set_add_duplicate_is_noop(xs in proptest::collection::vec(any::<i32>(), 1..50)) {
        let set = BoundedOrderedSet::new(BoundedSetConfig::new(100));
        for &x in &xs {
            set.add(x);
        }
        let before = set.to_vec();
        for &x in &xs {
            prop_assert!(!set.add(x));
        }
        prop_assert_eq!(set.to_vec(), before);
    }
}
