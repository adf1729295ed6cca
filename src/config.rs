//! Cache Configuration
//!
//! Configuration is a plain struct with public fields. Build it directly and
//! hand it to [`PolicyCache::init`](crate::PolicyCache::init) or, with the
//! `concurrent` feature, [`ConcurrentPolicyCache::init`](crate::ConcurrentPolicyCache::init).
//!
//! The capacity is a [`NonZeroUsize`], so a zero-sized cache cannot be
//! described here at all. Use [`PolicyCacheConfig::try_new`] when the
//! capacity comes from unchecked input.
//!
//! # Examples
//!
//! ```
//! use policy_cache::config::PolicyCacheConfig;
//! use policy_cache::{EvictionPolicy, PolicyCache};
//! use core::num::NonZeroUsize;
//!
//! let config = PolicyCacheConfig {
//!     capacity: NonZeroUsize::new(1_000).unwrap(),
//!     policy: EvictionPolicy::Lfu,
//! };
//! let cache: PolicyCache<String, Vec<u8>> = PolicyCache::init(config, None);
//! assert_eq!(cache.cap().get(), 1_000);
//! ```

use crate::error::CacheError;
use crate::policy::EvictionPolicy;
use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for a [`PolicyCache`](crate::PolicyCache).
///
/// # Fields
///
/// - `capacity`: Maximum number of entries the cache holds
/// - `policy`: Which entry to evict when a new key arrives at capacity
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PolicyCacheConfig {
    /// Maximum number of key-value pairs the cache can hold.
    pub capacity: NonZeroUsize,
    /// Eviction policy, fixed for the lifetime of the cache.
    pub policy: EvictionPolicy,
}

impl PolicyCacheConfig {
    /// Builds a configuration from a raw capacity.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ZeroCapacity`] if `capacity` is zero.
    pub fn try_new(capacity: usize, policy: EvictionPolicy) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::ZeroCapacity)?;
        Ok(PolicyCacheConfig { capacity, policy })
    }
}

impl fmt::Debug for PolicyCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyCacheConfig")
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .finish()
    }
}
