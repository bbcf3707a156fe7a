//! LRU Cache Engine
//!
//! Capacity- and TTL-bound store combining a recency list, a key index,
//! and an expiration index, with one background cleanup task per instance.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::config::{EvictionCallback, Options, DEFAULT_CLEANUP_INTERVAL};
use crate::error::Result;
use crate::store::recency::{Entry, RecencyList};
use crate::store::{CacheStats, SizedValue, Store};
use crate::tasks::spawn_cleanup_task;

// == Engine State ==
/// Indexes and counters guarded by the engine's lock.
///
/// Invariants (hold whenever the lock is released):
/// - every live key has exactly one slot in `list` and one handle in `items`
/// - every key in `expires` is also in `items`
/// - `used_bytes` is the sum of live entries' accounted sizes
pub(crate) struct LruState<V> {
    list: RecencyList<V>,
    items: HashMap<String, usize>,
    expires: HashMap<String, Instant>,
    max_bytes: i64,
    used_bytes: i64,
    stats: CacheStats,
    on_evicted: Option<EvictionCallback<V>>,
    closed: bool,
}

impl<V: std::fmt::Debug> std::fmt::Debug for LruState<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruState")
            .field("list", &self.list)
            .field("items", &self.items)
            .field("expires", &self.expires)
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("stats", &self.stats)
            .field("closed", &self.closed)
            .finish()
    }
}

impl<V> LruState<V> {
    fn new(max_bytes: i64, on_evicted: Option<EvictionCallback<V>>) -> Self {
        Self {
            list: RecencyList::new(),
            items: HashMap::new(),
            expires: HashMap::new(),
            max_bytes,
            used_bytes: 0,
            stats: CacheStats::new(),
            on_evicted,
            closed: false,
        }
    }

    /// True once `close` has run. Checked by the sweep task under the
    /// write lock so no sweep can fire after `close` returns.
    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    fn is_expired(&self, key: &str, now: Instant) -> bool {
        self.expires.get(key).is_some_and(|&expire| now >= expire)
    }

    /// Single removal path: unlinks the entry from all three indexes,
    /// credits back its accounted size, and fires the eviction callback.
    fn remove_index(&mut self, idx: usize) -> Entry<V> {
        let entry = self.list.remove(idx);
        self.items.remove(&entry.key);
        self.expires.remove(&entry.key);
        self.used_bytes -= entry.size_bytes;
        if let Some(callback) = &self.on_evicted {
            callback(&entry.key, &entry.value);
        }
        entry
    }

    /// Removes expired entries, then pops the least-recently-used end
    /// until usage fits the budget. Returns the number of removals.
    pub(crate) fn evict(&mut self, now: Instant) -> usize {
        let mut removed = 0;

        // expiration pass
        let expired: Vec<String> = self
            .expires
            .iter()
            .filter(|(_, &expire)| now >= expire)
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            if let Some(&idx) = self.items.get(&key) {
                self.remove_index(idx);
                self.stats.record_expiration();
                removed += 1;
            }
        }

        // capacity pass
        while self.max_bytes > 0 && self.used_bytes > self.max_bytes {
            let Some(idx) = self.list.front() else {
                break;
            };
            self.remove_index(idx);
            self.stats.record_eviction();
            removed += 1;
        }

        removed
    }
}

// == LRU Store ==
/// The working cache engine: byte-budgeted storage with recency eviction,
/// per-key TTL, and a periodic background sweep.
///
/// Values cross the store boundary by value; callers never receive a
/// handle into internal structure. Wrap large payloads in [`Arc`] to keep
/// `get` clones cheap.
///
/// The eviction callback runs synchronously while the engine's exclusive
/// lock is held. It must not call back into the same store instance.
pub struct LruStore<V> {
    state: Arc<RwLock<LruState<V>>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V: std::fmt::Debug> std::fmt::Debug for LruStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruStore").field("state", &self.state).finish()
    }
}

impl<V> LruStore<V>
where
    V: SizedValue + Clone + Send + Sync + 'static,
{
    /// Creates an engine with default options.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The engine
    /// spawns its background cleanup task during construction.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Creates an engine with the given options.
    ///
    /// A zero cleanup interval falls back to the one-minute default. The
    /// bucket fields in [`Options`] belong to the two-queue policy and are
    /// ignored here.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The engine
    /// spawns its background cleanup task during construction.
    pub fn with_options(options: Options<V>) -> Self {
        let interval = if options.cleanup_interval.is_zero() {
            DEFAULT_CLEANUP_INTERVAL
        } else {
            options.cleanup_interval
        };
        let state = Arc::new(RwLock::new(LruState::new(
            options.max_bytes,
            options.on_evicted,
        )));
        let sweeper = spawn_cleanup_task(Arc::clone(&state), interval);
        Self {
            state,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    // == Get ==
    /// Returns the value stored under `key`, marking it most recently used.
    ///
    /// An expired entry is removed in the same critical section and
    /// reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut state = self.state.write();
        let Some(&idx) = state.items.get(key) else {
            state.stats.record_miss();
            return None;
        };
        if state.is_expired(key, Instant::now()) {
            state.remove_index(idx);
            state.stats.record_expiration();
            state.stats.record_miss();
            return None;
        }
        let value = state.list.entry(idx).value.clone();
        state.list.move_to_back(idx);
        state.stats.record_hit();
        Some(value)
    }

    // == Set ==
    /// Stores `value` under `key` with no expiration.
    pub fn set(&self, key: &str, value: V) -> Result<()> {
        self.set_with_expiration(key, value, Duration::ZERO)
    }

    /// Stores `value` under `key`, expiring after `ttl` (zero = never).
    ///
    /// The TTL is replaced wholesale: a zero `ttl` clears any expiry the
    /// key already carried. Eviction runs before returning, so the byte
    /// budget holds once the call completes.
    pub fn set_with_expiration(&self, key: &str, value: V, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut state = self.state.write();

        if ttl > Duration::ZERO {
            state.expires.insert(key.to_string(), now + ttl);
        } else {
            state.expires.remove(key);
        }

        let size_bytes = (key.len() + value.size_bytes()) as i64;
        if let Some(&idx) = state.items.get(key) {
            // update in place, accounting only the size delta
            let entry = state.list.entry_mut(idx);
            entry.value = value;
            let old_size = std::mem::replace(&mut entry.size_bytes, size_bytes);
            state.used_bytes += size_bytes - old_size;
            state.list.move_to_back(idx);
        } else {
            let idx = state.list.push_back(Entry {
                key: key.to_string(),
                value,
                size_bytes,
            });
            state.items.insert(key.to_string(), idx);
            state.used_bytes += size_bytes;
        }

        state.evict(now);
        Ok(())
    }

    // == Delete ==
    /// Removes the entry under `key`. Returns whether the key existed.
    pub fn delete(&self, key: &str) -> bool {
        let mut state = self.state.write();
        match state.items.get(key) {
            Some(&idx) => {
                state.remove_index(idx);
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Removes every entry, firing the eviction callback once per entry.
    pub fn clear(&self) {
        let mut state = self.state.write();
        let LruState {
            list,
            items,
            expires,
            used_bytes,
            on_evicted,
            ..
        } = &mut *state;
        for entry in list.drain() {
            if let Some(callback) = on_evicted.as_ref() {
                callback(&entry.key, &entry.value);
            }
        }
        items.clear();
        expires.clear();
        *used_bytes = 0;
    }

    // == Length ==
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.state.read().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().list.is_empty()
    }

    // == Auxiliary Reads ==
    /// Returns the value and its remaining TTL (zero when none is set).
    ///
    /// Touches recency like [`get`](Self::get); an expired entry is
    /// removed and reported as absent.
    pub fn get_with_expiration(&self, key: &str) -> Option<(V, Duration)> {
        let now = Instant::now();
        let mut state = self.state.write();
        let Some(&idx) = state.items.get(key) else {
            state.stats.record_miss();
            return None;
        };
        if state.is_expired(key, now) {
            state.remove_index(idx);
            state.stats.record_expiration();
            state.stats.record_miss();
            return None;
        }
        let remaining = state
            .expires
            .get(key)
            .map(|&expire| expire - now)
            .unwrap_or(Duration::ZERO);
        let value = state.list.entry(idx).value.clone();
        state.list.move_to_back(idx);
        state.stats.record_hit();
        Some((value, remaining))
    }

    /// Returns the raw expiry instant, if one is set. Does not touch
    /// recency.
    pub fn get_expiration(&self, key: &str) -> Option<Instant> {
        self.state.read().expires.get(key).copied()
    }

    /// Rewrites the TTL for an existing key without touching its value or
    /// recency position. Returns false if the key does not exist.
    pub fn update_expiration(&self, key: &str, ttl: Duration) -> bool {
        let mut state = self.state.write();
        if !state.items.contains_key(key) {
            return false;
        }
        if ttl > Duration::ZERO {
            state.expires.insert(key.to_string(), Instant::now() + ttl);
        } else {
            state.expires.remove(key);
        }
        true
    }

    // == Introspection ==
    /// Accounted size of all live entries.
    pub fn used_bytes(&self) -> i64 {
        self.state.read().used_bytes
    }

    /// Configured byte budget; zero or negative means unlimited.
    pub fn max_bytes(&self) -> i64 {
        self.state.read().max_bytes
    }

    /// Changes the byte budget. A ceiling below current usage evicts
    /// immediately; a non-positive ceiling disables capacity eviction.
    pub fn set_max_bytes(&self, max_bytes: i64) {
        let mut state = self.state.write();
        state.max_bytes = max_bytes;
        if max_bytes > 0 {
            state.evict(Instant::now());
        }
    }

    /// Snapshot of engine counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.read();
        let mut stats = state.stats.clone();
        stats.total_entries = state.list.len();
        stats.used_bytes = state.used_bytes;
        stats
    }

    // == Close ==
    /// Stops the background cleanup task. Idempotent.
    ///
    /// The closed flag is raised under the write lock, so a sweep already
    /// inside its critical section finishes before `close` returns, and
    /// any later sweep sees the flag and stops. No eviction callback fires
    /// after `close` returns. Operations called after close still work;
    /// only the background sweep is gone.
    pub fn close(&self) {
        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            self.state.write().closed = true;
            handle.abort();
        }
    }
}

impl<V> Default for LruStore<V>
where
    V: SizedValue + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Drop for LruStore<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
        }
    }
}

impl<V> Store<V> for LruStore<V>
where
    V: SizedValue + Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn get(&self, key: &str) -> Option<V> {
        LruStore::get(self, key)
    }

    fn set(&self, key: &str, value: V) -> Result<()> {
        LruStore::set(self, key, value)
    }

    fn set_with_expiration(&self, key: &str, value: V, ttl: Duration) -> Result<()> {
        LruStore::set_with_expiration(self, key, value, ttl)
    }

    fn delete(&self, key: &str) -> bool {
        LruStore::delete(self, key)
    }

    fn clear(&self) {
        LruStore::clear(self)
    }

    fn len(&self) -> usize {
        LruStore::len(self)
    }

    fn close(&self) {
        LruStore::close(self)
    }
}
