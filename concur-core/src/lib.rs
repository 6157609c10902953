//! Shared types for the concurrent containers crate
//!
//! This crate contains the fundamental error type and the small atomic
//! primitives used by both `ConcurrentDeque` and `BoundedOrderedSet`. It
//! provides:
//!
//! - A common error type with [`Error`] and [`Result`]
//! - [`AtomicCounter`], the approximate-cardinality counter both containers
//!   share
//!
//! # Example
//!
//! ```
//! use concur_core::AtomicCounter;
//!
//! let counter = AtomicCounter::new();
//! counter.increment();
//! assert_eq!(counter.get(), 1);
//! ```

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
