//! Configuration for [`crate::bounded_set::BoundedOrderedSet`]

/// Construction parameters for a [`BoundedOrderedSet`](crate::bounded_set::BoundedOrderedSet).
///
/// # Example
///
/// ```
/// use concur_containers::config::BoundedSetConfig;
///
/// let config = BoundedSetConfig::new(100);
/// assert_eq!(config.max, 100);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BoundedSetConfig {
    /// Maximum number of elements retained at once. Must be strictly
    /// positive; the underlying ordering is the element type's `Ord` impl,
    /// since this crate does not expose a pluggable comparator.
    pub max: usize,
}

impl BoundedSetConfig {
    /// Creates a config with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `max` is zero: a set with zero capacity can never hold an
    /// element and is not a useful configuration.
    pub fn new(max: usize) -> Self {
        assert!(max > 0, "BoundedSetConfig::max must be strictly positive");
        Self { max }
    }
}
