//! Error types.
//!
//! - [`CacheError`]: construction failed on unchecked input.
//! - [`InvariantError`]: a consistency check found the value store and the
//!   eviction tracker out of step.

extern crate alloc;

use alloc::string::String;
use core::fmt;

/// Errors reported when building a cache from unchecked input.
///
/// Lookups and removals never fail; a missing key is reported through
/// `Option` or `bool` return values instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CacheError {
    /// The requested capacity was zero.
    ZeroCapacity,
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::ZeroCapacity => f.write_str("cache capacity must be greater than zero"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CacheError {}

/// Returned by `check_invariants` when internal bookkeeping is inconsistent.
///
/// Carries a description of the first invariant that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates an error with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// The failed invariant.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvariantError {}
