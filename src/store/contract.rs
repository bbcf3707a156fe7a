//! Store Contract & Factory
//!
//! The abstract operations every cache policy implementation provides, and
//! the factory that selects an implementation by policy tag.

use std::fmt;
use std::time::Duration;

use crate::config::Options;
use crate::error::{CacheError, Result};
use crate::store::{LruStore, SizedValue};

// == Store Contract ==
/// Operations uniform across all cache policies.
///
/// Absence is reported through `Option`/`bool`, never as an error. All
/// operations are synchronous and run to completion; none accept a
/// deadline or cancellation token.
pub trait Store<V>: Send + Sync + fmt::Debug {
    /// Returns the value stored under `key`, marking it most recently used.
    /// An expired entry behaves as absent and is removed on the way out.
    fn get(&self, key: &str) -> Option<V>;

    /// Stores `value` under `key` with no expiration.
    fn set(&self, key: &str, value: V) -> Result<()>;

    /// Stores `value` under `key`, expiring after `ttl`.
    ///
    /// A zero `ttl` means no expiration; any TTL already attached to the
    /// key is replaced wholesale, never merged.
    fn set_with_expiration(&self, key: &str, value: V, ttl: Duration) -> Result<()>;

    /// Removes the entry under `key`. Returns whether the key existed.
    fn delete(&self, key: &str) -> bool;

    /// Removes every entry.
    fn clear(&self);

    /// Number of live entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stops the background cleanup task. Idempotent; no eviction callback
    /// fires after `close` returns.
    fn close(&self);
}

// == Policy ==
/// Eviction/retention strategy tag, selected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Recency-based engine with TTL and byte budget
    Lru,
    /// Reserved two-queue / frequency-aware variant; declared but not built
    TwoQueue,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Lru => write!(f, "LRU"),
            Policy::TwoQueue => write!(f, "TwoQueue"),
        }
    }
}

// == Factory ==
/// Constructs the store implementation selected by `policy`.
///
/// Construction never fails for [`Policy::Lru`]. [`Policy::TwoQueue`] is a
/// reserved interface point with no working logic and is rejected with
/// [`CacheError::UnsupportedPolicy`].
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime context: the engine spawns
/// its background cleanup task during construction.
pub fn new_store<V>(policy: Policy, options: Options<V>) -> Result<Box<dyn Store<V>>>
where
    V: SizedValue + Clone + Send + Sync + fmt::Debug + 'static,
{
    match policy {
        Policy::Lru => Ok(Box::new(LruStore::with_options(options))),
        Policy::TwoQueue => Err(CacheError::UnsupportedPolicy(policy)),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_display() {
        assert_eq!(Policy::Lru.to_string(), "LRU");
        assert_eq!(Policy::TwoQueue.to_string(), "TwoQueue");
    }

    #[tokio::test]
    async fn test_factory_builds_lru() {
        let store = new_store::<String>(Policy::Lru, Options::default()).unwrap();
        store.set("key", "value".to_string()).unwrap();
        assert_eq!(store.get("key"), Some("value".to_string()));
        store.close();
    }

    #[tokio::test]
    async fn test_factory_rejects_two_queue() {
        let result = new_store::<String>(Policy::TwoQueue, Options::default());
        assert!(matches!(
            result,
            Err(CacheError::UnsupportedPolicy(Policy::TwoQueue))
        ));
    }
}
