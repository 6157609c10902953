//! Error types shared by the concurrent containers
//!
//! This module defines the error types surfaced by `concur-containers`.

use thiserror::Error;

/// The error type for concurrent-container operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A strict accessor (`getFirst`, `removeFirst`, ...) was called on an
    /// empty container
    #[error("no such element")]
    NoSuchElement,

    /// The operation is not supported by this container, e.g. removal by
    /// equality on a `BoundedOrderedSet`, or calling `remove` on an
    /// iterator before `next` was observed
    #[error("not supported: {0}")]
    NotSupported(&'static str),

    /// A defensive check caught the container in a state that an invariant
    /// rules out. Implementations should treat this as a bug rather than
    /// silently continuing.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
}

/// A specialized `Result` type for concurrent-container operations
pub type Result<T> = std::result::Result<T, Error>;
