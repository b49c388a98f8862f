use std::fmt;
use std::marker::PhantomData;

use crate::utils::CacheError;

/// An object cache keyed by opaque string ids
///
/// Reads and writes never fail from the caller's point of view: a broken
/// entry reads as absent and a failed write is logged and forgotten. Only
/// `clear` reports errors, when the backing store cannot be enumerated.
pub trait Cache {
    type Value;

    /// Get a previously stored value, else `None`
    fn get(&self, id: &str) -> Option<Self::Value>;

    /// Store a value and hand it back
    fn put(&self, id: &str, value: Self::Value) -> Self::Value;

    /// Remove the entry for `id`, if any
    fn purge(&self, id: &str);

    /// Remove every entry owned by this cache
    fn clear(&self) -> Result<(), CacheError>;

    /// Return the cached value for `id`, or build, store and return it
    fn get_or_put_with<F, E>(&self, id: &str, build: F) -> Result<Self::Value, E>
    where
        Self: Sized,
        F: FnOnce() -> Result<Self::Value, E>,
    {
        if let Some(value) = self.get(id) {
            return Ok(value);
        }
        let value = build()?;
        Ok(self.put(id, value))
    }
}

/// The pass-through cache: stores nothing
pub struct NoCache<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> NoCache<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for NoCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for NoCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NoCache")
    }
}

impl<T> Cache for NoCache<T> {
    type Value = T;

    fn get(&self, _id: &str) -> Option<T> {
        None
    }

    fn put(&self, _id: &str, value: T) -> T {
        value
    }

    fn purge(&self, _id: &str) {}

    fn clear(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
