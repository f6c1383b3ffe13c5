//! Generic LRU-with-TTL cache.
//!
//! Generalizes the access-count approximation in `InMemoryCache` into
//! exact recency-ordered eviction: `IndexMap` preserves insertion order
//! and is reordered on every access via shift-to-back, so the entry at
//! the front is always the true least-recently-used one. Backs both
//! `ExtractionResults` and `SubtitleBlobs`.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tokio::sync::RwLock;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// A fixed-capacity cache with TTL expiry and least-recently-used
/// eviction. `Get`/`Put`/`Invalidate` are atomic with respect to
/// concurrent callers: each holds the single `RwLock` for its whole
/// critical section.
pub struct LruTtlCache<K, V> {
    entries: Arc<RwLock<IndexMap<K, Entry<V>>>>,
    capacity: usize,
    ttl: Duration,
}

impl<K, V> LruTtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self { entries: Arc::new(RwLock::new(IndexMap::new())), capacity, ttl }
    }

    /// Returns the value for `key` if present and not expired. A hit
    /// moves the entry to the most-recently-used end.
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();

        let expired = entries.get(key).map(|e| e.expires_at <= now).unwrap_or(false);
        if expired {
            entries.shift_remove(key);
            return None;
        }

        if let Some(entry) = entries.get(key) {
            let value = entry.value.clone();
            entries.shift_remove(key);
            entries.insert(key.clone(), Entry { value: value.clone(), expires_at: now + self.ttl });
            Some(value)
        } else {
            None
        }
    }

    /// Inserts or replaces `key`, refreshing its TTL and moving it to
    /// the most-recently-used end. Evicts the least-recently-used entry
    /// first if the cache is at capacity and `key` is new.
    pub async fn put(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            entries.shift_remove_index(0);
        }

        entries.shift_remove(&key);
        entries.insert(key, Entry { value, expires_at: Instant::now() + self.ttl });
    }

    pub async fn invalidate(&self, key: &K) {
        let mut entries = self.entries.write().await;
        entries.shift_remove(key);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Removes every expired entry. Intended to be driven by a
    /// periodic background sweep rather than called per-request.
    pub async fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    /// Spawns a background task that calls `sweep_expired` on a fixed
    /// interval for as long as the returned handle (or a clone of the
    /// cache's `Arc`) is alive.
    pub fn spawn_eager_sweep(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()>
    where
        K: 'static,
        V: 'static,
    {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = cache.sweep_expired().await;
                if removed > 0 {
                    tracing::debug!(removed, "swept expired cache entries");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let cache: LruTtlCache<String, u32> = LruTtlCache::new(2, Duration::from_secs(60));
        cache.put("a".to_string(), 1).await;
        assert_eq!(cache.get(&"a".to_string()).await, Some(1));
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let cache: LruTtlCache<&str, u32> = LruTtlCache::new(2, Duration::from_secs(60));
        cache.put("a", 1).await;
        cache.put("b", 2).await;
        // touch "a" so "b" becomes the least-recently-used entry
        let _ = cache.get(&"a").await;
        cache.put("c", 3).await;

        assert_eq!(cache.get(&"b").await, None);
        assert_eq!(cache.get(&"a").await, Some(1));
        assert_eq!(cache.get(&"c").await, Some(3));
    }

    #[tokio::test]
    async fn expired_entry_is_not_returned() {
        let cache: LruTtlCache<&str, u32> = LruTtlCache::new(10, Duration::from_millis(10));
        cache.put("a", 1).await;
        sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get(&"a").await, None);
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache: LruTtlCache<&str, u32> = LruTtlCache::new(10, Duration::from_secs(60));
        cache.put("a", 1).await;
        cache.invalidate(&"a").await;
        assert_eq!(cache.get(&"a").await, None);
    }

    #[tokio::test]
    async fn sweep_expired_removes_only_expired_entries() {
        let cache: LruTtlCache<&str, u32> = LruTtlCache::new(10, Duration::from_millis(10));
        cache.put("a", 1).await;
        sleep(Duration::from_millis(30)).await;
        cache.put("b", 2).await;
        let removed = cache.sweep_expired().await;
        assert_eq!(removed, 1);
        assert_eq!(cache.len().await, 1);
    }
}
