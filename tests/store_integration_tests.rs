//! Integration tests for the public cache API
//!
//! Exercises the factory, the Store contract, and the LRU engine the way
//! an embedding cache node would: through the crate's public surface only.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytecache::{new_store, CacheError, LruStore, Options, Policy, SizedValue, Store};

#[tokio::test]
async fn factory_returns_working_lru_store() {
    let store = new_store::<String>(Policy::Lru, Options::default()).unwrap();

    store.set("alpha", "1".to_string()).unwrap();
    store.set("beta", "2".to_string()).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.get("alpha"), Some("1".to_string()));
    assert!(store.delete("beta"));
    assert!(!store.delete("beta"));

    store.clear();
    assert!(store.is_empty());
    store.close();
}

#[tokio::test]
async fn factory_rejects_reserved_policy() {
    let err = new_store::<String>(Policy::TwoQueue, Options::default()).unwrap_err();
    assert!(matches!(err, CacheError::UnsupportedPolicy(Policy::TwoQueue)));
    assert_eq!(
        err.to_string(),
        "cache policy TwoQueue has no working implementation"
    );
}

#[tokio::test]
async fn capacity_pressure_evicts_coldest_keys_first() {
    // 1-byte keys with 3-byte values: 4 accounted bytes per entry
    let store: LruStore<String> =
        LruStore::with_options(Options::default().with_max_bytes(10));

    store.set("a", "xxx".to_string()).unwrap();
    store.set("b", "yyy".to_string()).unwrap();
    store.set("c", "zzz".to_string()).unwrap();

    // 12 bytes exceeds the 10-byte budget, so the coldest entry goes
    assert_eq!(store.get("a"), None);
    assert_eq!(store.len(), 2);
    assert_eq!(store.used_bytes(), 8);
}

#[tokio::test]
async fn get_refreshes_recency_before_eviction() {
    let store: LruStore<String> =
        LruStore::with_options(Options::default().with_max_bytes(0));

    store.set("a", "1".to_string()).unwrap();
    store.set("b", "2".to_string()).unwrap();
    store.set("c", "3".to_string()).unwrap();

    assert_eq!(store.get("a"), Some("1".to_string()));

    // shrink so exactly one entry must go: "b" is now the coldest
    store.set_max_bytes(4);

    assert_eq!(store.get("b"), None);
    assert_eq!(store.get("a"), Some("1".to_string()));
    assert_eq!(store.get("c"), Some("3".to_string()));
}

#[tokio::test]
async fn expired_key_behaves_as_absent() {
    let store: LruStore<String> = LruStore::new();

    store
        .set_with_expiration("x", "v".to_string(), Duration::from_millis(50))
        .unwrap();
    assert_eq!(store.get("x"), Some("v".to_string()));

    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(store.get("x"), None);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn background_sweep_expires_untouched_keys() {
    let store: LruStore<String> = LruStore::with_options(
        Options::default().with_cleanup_interval(Duration::from_millis(40)),
    );

    store
        .set_with_expiration("ephemeral", "v".to_string(), Duration::from_millis(20))
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    // no read ever observed the key; the sweeper removed it
    assert_eq!(store.len(), 0);
    store.close();
}

#[tokio::test]
async fn eviction_callback_sees_every_removal() {
    let removed: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&removed);

    let store: LruStore<String> = LruStore::with_options(
        Options::default()
            .with_max_bytes(4)
            .with_on_evicted(move |key, value: &String| {
                log.lock().unwrap().push((key.to_string(), value.clone()))
            }),
    );

    store.set("a", "1".to_string()).unwrap();
    store.set("b", "2".to_string()).unwrap();
    store.set("c", "3".to_string()).unwrap(); // pushes "a" out
    store.delete("b");
    store.clear(); // "c" is the only survivor

    let removed = removed.lock().unwrap();
    assert_eq!(
        removed.as_slice(),
        [
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("c".to_string(), "3".to_string()),
        ]
    );
}

#[tokio::test]
async fn ttl_rewrite_without_touching_value() {
    let store: LruStore<String> = LruStore::new();

    store.set("k", "v".to_string()).unwrap();
    assert!(store.get_expiration("k").is_none());

    assert!(store.update_expiration("k", Duration::from_secs(30)));
    let (value, remaining) = store.get_with_expiration("k").unwrap();
    assert_eq!(value, "v");
    assert!(remaining > Duration::from_secs(29));

    assert!(store.update_expiration("k", Duration::ZERO));
    assert!(store.get_expiration("k").is_none());

    assert!(!store.update_expiration("ghost", Duration::from_secs(1)));
}

#[tokio::test]
async fn close_twice_is_harmless() {
    let store = new_store::<String>(Policy::Lru, Options::default()).unwrap();
    store.set("k", "v".to_string()).unwrap();

    store.close();
    store.close();

    assert_eq!(store.get("k"), Some("v".to_string()));
}

#[tokio::test]
async fn arc_wrapped_values_share_one_payload() {
    #[derive(Clone, PartialEq, Debug)]
    struct Blob(Vec<u8>);

    impl SizedValue for Blob {
        fn size_bytes(&self) -> usize {
            self.0.len()
        }
    }

    let store: LruStore<Arc<Blob>> =
        LruStore::with_options(Options::default().with_max_bytes(0));
    let payload = Arc::new(Blob(vec![7u8; 1024]));

    store.set("blob", Arc::clone(&payload)).unwrap();

    assert_eq!(store.used_bytes(), 4 + 1024);
    let fetched = store.get("blob").unwrap();
    assert!(Arc::ptr_eq(&fetched, &payload));
}

#[tokio::test]
async fn stats_snapshot_reflects_state() {
    let store: LruStore<String> = LruStore::new();

    store.set("a", "1234".to_string()).unwrap();
    store.get("a");
    store.get("missing");

    let stats = store.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.used_bytes, 5);
    assert_eq!(stats.hit_rate(), 0.5);

    let json = serde_json::to_string(&stats).unwrap();
    assert!(json.contains("\"hits\":1"));
}

#[tokio::test]
async fn concurrent_writers_keep_accounting_consistent() {
    let store: Arc<LruStore<String>> =
        Arc::new(LruStore::with_options(Options::default().with_max_bytes(0)));

    let mut handles = Vec::new();
    for worker in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::task::spawn_blocking(move || {
            for i in 0..50 {
                let key = format!("w{worker}-{i}");
                store.set(&key, "x".repeat(8)).unwrap();
                assert_eq!(store.get(&key), Some("x".repeat(8)));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.len(), 400);
    let expected: i64 = (0..8)
        .flat_map(|w| (0..50).map(move |i| format!("w{w}-{i}").len() as i64 + 8))
        .sum();
    assert_eq!(store.used_bytes(), expected);
}
