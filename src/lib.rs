//! ByteCache - a byte-budgeted in-memory cache engine
//!
//! Stores arbitrarily sized values under string keys with optional per-key
//! TTL, a global byte budget enforced by LRU eviction, and a periodic
//! background sweep. Built to sit behind a distributed cache node; the
//! network, routing, and membership layers live elsewhere and talk to this
//! crate only through the [`Store`] contract.
//!
//! ```no_run
//! use bytecache::{new_store, Options, Policy, Store};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = new_store::<String>(Policy::Lru, Options::default()).unwrap();
//!     store.set("greeting", "hello".to_string()).unwrap();
//!     store
//!         .set_with_expiration("session", "token".to_string(), Duration::from_secs(30))
//!         .unwrap();
//!     assert_eq!(store.get("greeting"), Some("hello".to_string()));
//!     store.close();
//! }
//! ```

pub mod config;
pub mod error;
pub mod store;

mod tasks;

pub use config::{EvictionCallback, Options, DEFAULT_CLEANUP_INTERVAL, DEFAULT_MAX_BYTES};
pub use error::{CacheError, Result};
pub use store::{new_store, CacheStats, LruStore, Policy, SizedValue, Store};
