//! Store Module
//!
//! The cache engine: policy contract, sized-value capability, recency
//! index, and the working LRU implementation.

mod contract;
mod lru;
mod recency;
mod stats;
mod value;


// Re-export public types
pub use contract::{new_store, Policy, Store};
pub use lru::LruStore;
pub use stats::CacheStats;
pub use value::SizedValue;

pub(crate) use lru::LruState;
