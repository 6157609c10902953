//! Concurrent containers
//!
//! This crate implements two lock-free concurrent collections:
//!
//! - [`ConcurrentDeque`](concurrent_deque::ConcurrentDeque): an unbounded
//!   double-ended queue supporting insertion and removal at both ends,
//!   O(1) removal of a previously-returned node handle, and weakly
//!   consistent iteration in either direction.
//! - [`BoundedOrderedSet`](bounded_set::BoundedOrderedSet): a fixed-capacity
//!   ordered set, built on a lock-free skip list, that evicts its smallest
//!   element whenever an insertion would exceed capacity.
//!
//! # Example
//!
//! ```
//! use concur_containers::ConcurrentDeque;
//!
//! let deque = ConcurrentDeque::new();
//! deque.add_last(1);
//! deque.add_first(0);
//! assert_eq!(deque.poll_first(), Some(0));
//! assert_eq!(deque.poll_last(), Some(1));
//! ```

pub mod bounded_set;
pub mod concurrent_deque;
pub mod config;

pub use bounded_set::BoundedOrderedSet;
pub use concurrent_deque::{ConcurrentDeque, DequeNode, DescendingIter, Iter, Polled};
pub use config::BoundedSetConfig;
