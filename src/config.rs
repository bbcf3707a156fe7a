//! Configuration Module
//!
//! Options bundle consumed by the store factory and the engines it builds.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default byte budget (8 KiB).
pub const DEFAULT_MAX_BYTES: i64 = 8 * 1024;

/// Default interval between background cleanup runs.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Callback invoked for every entry removal, regardless of cause.
///
/// Runs synchronously inside the engine's exclusive critical section: the
/// callback must not call back into the same store instance, or it will
/// deadlock.
pub type EvictionCallback<V> = Arc<dyn Fn(&str, &V) + Send + Sync>;

// == Options ==
/// Store configuration parameters.
///
/// `bucket_count`, `capacity_per_bucket`, and `level2_capacity` are only
/// meaningful to the two-queue policy; the LRU engine accepts and ignores
/// them.
pub struct Options<V> {
    /// Capacity ceiling in bytes; zero or negative disables capacity eviction
    pub max_bytes: i64,
    /// Number of two-queue buckets
    pub bucket_count: u16,
    /// Capacity of each two-queue bucket
    pub capacity_per_bucket: u16,
    /// Capacity of the two-queue second level
    pub level2_capacity: u16,
    /// Background cleanup cadence; a zero interval falls back to the default
    pub cleanup_interval: Duration,
    /// Invoked for every removal (delete, capacity, expiry, clear)
    pub on_evicted: Option<EvictionCallback<V>>,
}

impl<V> Default for Options<V> {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            bucket_count: 16,
            capacity_per_bucket: 512,
            level2_capacity: 256,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            on_evicted: None,
        }
    }
}

impl<V> Options<V> {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_BYTES` - Capacity ceiling in bytes (default: 8192)
    /// - `BUCKET_COUNT` - Two-queue bucket count (default: 16)
    /// - `CAP_PER_BUCKET` - Two-queue per-bucket capacity (default: 512)
    /// - `LEVEL2_CAPACITY` - Two-queue second-level capacity (default: 256)
    /// - `CLEANUP_INTERVAL` - Cleanup cadence in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_bytes: env::var("MAX_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_bytes),
            bucket_count: env::var("BUCKET_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bucket_count),
            capacity_per_bucket: env::var("CAP_PER_BUCKET")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity_per_bucket),
            level2_capacity: env::var("LEVEL2_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.level2_capacity),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            on_evicted: None,
        }
    }

    /// Sets the capacity ceiling in bytes.
    pub fn with_max_bytes(mut self, max_bytes: i64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Sets the background cleanup cadence.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Sets the eviction callback.
    pub fn with_on_evicted(mut self, callback: impl Fn(&str, &V) + Send + Sync + 'static) -> Self {
        self.on_evicted = Some(Arc::new(callback));
        self
    }
}

impl<V> Clone for Options<V> {
    fn clone(&self) -> Self {
        Self {
            max_bytes: self.max_bytes,
            bucket_count: self.bucket_count,
            capacity_per_bucket: self.capacity_per_bucket,
            level2_capacity: self.level2_capacity,
            cleanup_interval: self.cleanup_interval,
            on_evicted: self.on_evicted.clone(),
        }
    }
}

impl<V> fmt::Debug for Options<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("max_bytes", &self.max_bytes)
            .field("bucket_count", &self.bucket_count)
            .field("capacity_per_bucket", &self.capacity_per_bucket)
            .field("level2_capacity", &self.level2_capacity)
            .field("cleanup_interval", &self.cleanup_interval)
            .field("on_evicted", &self.on_evicted.as_ref().map(|_| "..."))
            .finish()
    }
}
