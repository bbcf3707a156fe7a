//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.
//!
//! The taxonomy is intentionally thin: lookups report absence through
//! `Option`/`bool` rather than errors, and no engine operation can fail
//! transiently. The only constructed error is the factory rejecting a
//! policy tag that has no working implementation.

use thiserror::Error;

use crate::store::Policy;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Requested policy is declared but carries no working implementation
    #[error("cache policy {0} has no working implementation")]
    UnsupportedPolicy(Policy),
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
