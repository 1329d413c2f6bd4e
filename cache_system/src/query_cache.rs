//! Bounded, time-limited cache for prepared queries
//!
//! Entries are keyed by statement text and expire once they are older than the
//! configured lifetime. When the cache is full, expired entries are dropped
//! first and then the least-recently-inserted entry is evicted. Reads do not
//! refresh an entry's position; re-inserting a key does.

use crate::clock::{Clock, SystemClock};
use crate::errors::CacheError;
use config::QueryCacheConfig;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Counters describing cache effectiveness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped to make room for new ones
    pub evictions: u64,
    /// Entries dropped because they outlived the lifetime
    pub expirations: u64,
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    seq: u64,
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion sequence -> key, oldest first
    insertion_order: BTreeMap<u64, String>,
    next_seq: u64,
    stats: CacheStats,
}

impl<V> CacheState<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: BTreeMap::new(),
            next_seq: 0,
            stats: CacheStats::default(),
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.insertion_order.remove(&entry.seq);
        Some(entry)
    }

    /// Insertion order follows the clock, so expired entries form a prefix.
    fn purge_expired(&mut self, now: Instant, lifetime: Duration) {
        while let Some((_, key)) = self.insertion_order.first_key_value() {
            let expired = self
                .entries
                .get(key)
                .is_none_or(|entry| is_expired(entry.inserted_at, now, lifetime));
            if !expired {
                break;
            }
            if let Some((_, key)) = self.insertion_order.pop_first() {
                if self.entries.remove(&key).is_some() {
                    self.stats.expirations += 1;
                }
            }
        }
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.insertion_order.pop_first()?;
        self.entries.remove(&key);
        self.stats.evictions += 1;
        Some(key)
    }
}

fn is_expired(inserted_at: Instant, now: Instant, lifetime: Duration) -> bool {
    now.saturating_duration_since(inserted_at) >= lifetime
}

/// In-process prepared-query cache
///
/// Cloning is cheap and clones share the same entries.
#[derive(Clone)]
pub struct QueryCache<V> {
    state: Arc<Mutex<CacheState<V>>>,
    capacity: usize,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl<V> Debug for QueryCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = match self.state.try_lock() {
            Ok(state) => state.entries.len().to_string(),
            Err(_) => "locked".to_string(),
        };

        f.debug_struct("QueryCache")
            .field("capacity", &self.capacity)
            .field("lifetime", &self.lifetime)
            .field("entries", &entries)
            .finish()
    }
}

impl<V: Clone> QueryCache<V> {
    /// Create a new cache using the system clock
    pub fn new(capacity: usize, lifetime: Duration) -> Result<Self, CacheError> {
        Self::with_clock(capacity, lifetime, Arc::new(SystemClock))
    }

    /// Create a new cache with a custom time source
    pub fn with_clock(
        capacity: usize,
        lifetime: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }
        if lifetime.is_zero() {
            return Err(CacheError::InvalidLifetime(0));
        }

        Ok(Self {
            state: Arc::new(Mutex::new(CacheState::new())),
            capacity,
            lifetime,
            clock,
        })
    }

    pub fn from_config(config: &QueryCacheConfig) -> Result<Self, CacheError> {
        Self::new(config.capacity, config.lifetime())
    }

    pub fn from_config_with_clock(
        config: &QueryCacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CacheError> {
        Self::with_clock(config.capacity, config.lifetime(), clock)
    }

    /// Look up a live entry; expired entries are removed and reported absent
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let Ok(mut state) = self.state.lock() else {
            return None;
        };

        let expired = match state.entries.get(key) {
            None => {
                state.stats.misses += 1;
                return None;
            }
            Some(entry) => is_expired(entry.inserted_at, now, self.lifetime),
        };

        if expired {
            state.remove(key);
            state.stats.expirations += 1;
            state.stats.misses += 1;
            tracing::trace!("Query cache entry expired: {}", key);
            return None;
        }

        state.stats.hits += 1;
        state.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Insert or replace an entry, evicting to stay within capacity
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now();
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        // Replacing refreshes both the lifetime and the insertion position
        state.remove(&key);

        if state.entries.len() >= self.capacity {
            state.purge_expired(now, self.lifetime);
        }
        while state.entries.len() >= self.capacity {
            match state.evict_oldest() {
                Some(evicted) => tracing::trace!("Query cache evicted: {}", evicted),
                None => break,
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.insertion_order.insert(seq, key.clone());
        state.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
                seq,
            },
        );
    }

    /// Return the cached value or build, store and return a new one
    ///
    /// The builder runs without holding the lock, so concurrent misses on the
    /// same key may each build a value; the last one stored wins. Builder
    /// errors are returned unchanged and nothing is cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, build: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = build().await?;
        self.put(key, value.clone());
        Ok(value)
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        let Ok(mut state) = self.state.lock() else {
            return None;
        };
        state.remove(key).map(|entry| entry.value)
    }

    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.entries.clear();
            state.insertion_order.clear();
        }
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.state
            .lock()
            .map(|s| s.entries.contains_key(key))
            .unwrap_or(false)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn stats(&self) -> CacheStats {
        self.state.lock().map(|s| s.stats).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn manual_cache(capacity: usize, lifetime_ms: u64) -> (QueryCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache =
            QueryCache::with_clock(capacity, Duration::from_millis(lifetime_ms), clock.clone())
                .unwrap();
        (cache, clock)
    }

    #[test]
    fn test_rejects_zero_capacity_and_lifetime() {
        assert_eq!(
            QueryCache::<String>::new(0, Duration::from_secs(1)).unwrap_err(),
            CacheError::InvalidCapacity(0)
        );
        assert_eq!(
            QueryCache::<String>::new(10, Duration::ZERO).unwrap_err(),
            CacheError::InvalidLifetime(0)
        );
    }

    #[test]
    fn test_from_config_defaults() {
        let cache = QueryCache::<String>::from_config(&QueryCacheConfig::default()).unwrap();
        assert_eq!(cache.capacity(), 1000);
        assert_eq!(cache.lifetime(), Duration::from_secs(600));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entry_expires_after_lifetime() {
        let (cache, clock) = manual_cache(10, 1000);

        cache.put("SELECT * FROM t", "artifactA".to_string());

        clock.set_elapsed(Duration::from_millis(500));
        assert_eq!(cache.get("SELECT * FROM t"), Some("artifactA".to_string()));

        clock.set_elapsed(Duration::from_millis(1500));
        assert_eq!(cache.get("SELECT * FROM t"), None);
        assert!(!cache.contains_key("SELECT * FROM t"));
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_entry_expires_exactly_at_lifetime() {
        let (cache, clock) = manual_cache(10, 1000);
        cache.put("q", "a".to_string());

        clock.advance(Duration::from_millis(1000));
        assert_eq!(cache.get("q"), None);
    }

    #[test]
    fn test_capacity_overflow_evicts_exactly_one() {
        let (cache, _clock) = manual_cache(3, 60_000);

        for i in 0..4 {
            cache.put(format!("q{}", i), format!("a{}", i));
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.get("q0"), None);
        assert_eq!(cache.get("q1"), Some("a1".to_string()));
        assert_eq!(cache.get("q3"), Some("a3".to_string()));
    }

    #[test]
    fn test_eviction_ignores_reads() {
        let (cache, _clock) = manual_cache(2, 60_000);
        cache.put("first", "1".to_string());
        cache.put("second", "2".to_string());

        // Reading does not protect the oldest insertion
        assert!(cache.get("first").is_some());
        cache.put("third", "3".to_string());

        assert_eq!(cache.get("first"), None);
        assert!(cache.get("second").is_some());
        assert!(cache.get("third").is_some());
    }

    #[test]
    fn test_reinsert_refreshes_position_and_lifetime() {
        let (cache, clock) = manual_cache(2, 1000);
        cache.put("a", "1".to_string());
        cache.put("b", "2".to_string());

        clock.advance(Duration::from_millis(800));
        cache.put("a", "1b".to_string());
        assert_eq!(cache.len(), 2);

        // "b" is now the oldest insertion
        cache.put("c", "3".to_string());
        assert_eq!(cache.get("b"), None);

        clock.advance(Duration::from_millis(500));
        assert_eq!(cache.get("a"), Some("1b".to_string()));
    }

    #[test]
    fn test_full_cache_drops_expired_before_live_entries() {
        let (cache, clock) = manual_cache(3, 1000);
        cache.put("old1", "x".to_string());
        cache.put("old2", "x".to_string());

        clock.advance(Duration::from_millis(600));
        cache.put("fresh", "y".to_string());

        clock.advance(Duration::from_millis(600));
        cache.put("newest", "z".to_string());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.stats().expirations, 2);
        assert!(cache.get("fresh").is_some());
        assert!(cache.get("newest").is_some());
    }

    #[test]
    fn test_remove_and_clear() {
        let (cache, _clock) = manual_cache(5, 60_000);
        cache.put("a", "1".to_string());
        cache.put("b", "2".to_string());

        assert_eq!(cache.remove("a"), Some("1".to_string()));
        assert_eq!(cache.remove("a"), None);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());

        // Order bookkeeping is cleared too, so a full refill evicts nothing
        for i in 0..5 {
            cache.put(format!("k{}", i), "v".to_string());
        }
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        let (cache, _clock) = manual_cache(5, 60_000);
        assert!(cache.get("missing").is_none());
        cache.put("present", "v".to_string());
        assert!(cache.get("present").is_some());
        assert!(cache.get("present").is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_clones_share_entries() {
        let (cache, _clock) = manual_cache(5, 60_000);
        let other = cache.clone();
        other.put("shared", "v".to_string());
        assert_eq!(cache.get("shared"), Some("v".to_string()));
    }

    #[test]
    fn test_concurrent_access_respects_capacity() {
        let cache = QueryCache::<usize>::new(64, Duration::from_secs(60)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..500 {
                        let key = format!("t{}-q{}", t, i % 100);
                        if cache.get(&key).is_none() {
                            cache.put(key, i);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 64);
        let state = cache.state.lock().unwrap();
        assert_eq!(state.entries.len(), state.insertion_order.len());
    }

    #[tokio::test]
    async fn test_get_or_try_insert_with_builds_once_on_miss() {
        let (cache, _clock) = manual_cache(5, 60_000);
        let mut builds = 0;

        let first: Result<String, String> = cache
            .get_or_try_insert_with("q", || {
                builds += 1;
                async { Ok("compiled".to_string()) }
            })
            .await;
        assert_eq!(first.unwrap(), "compiled");

        let second: Result<String, String> = cache
            .get_or_try_insert_with("q", || async { Err("should not run".to_string()) })
            .await;
        assert_eq!(second.unwrap(), "compiled");
        assert_eq!(builds, 1);
    }

    #[tokio::test]
    async fn test_get_or_try_insert_with_does_not_cache_errors() {
        let (cache, _clock) = manual_cache(5, 60_000);

        let failed: Result<String, &str> = cache
            .get_or_try_insert_with("q", || async { Err("compile failed") })
            .await;
        assert_eq!(failed.unwrap_err(), "compile failed");
        assert!(cache.is_empty());
    }
}
