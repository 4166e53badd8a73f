use crate::core::cache::Cache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct CacheValue<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheValue<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expiry| expiry > now)
    }
}

/// In-memory cache implementation using a HashMap behind an async Mutex
#[derive(Clone)]
pub struct MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, CacheValue<V>>>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug,
    V: Clone + Send + Sync,
{
    /// Creates a new MemoryCache instance
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Atomically replaces the value for `key` with `update(current)`.
    ///
    /// A live entry keeps its original expiry; a missing or expired entry is
    /// created with `ttl`. Returns the previous live value and the new one.
    pub async fn upsert_with<F>(&self, key: K, ttl: Option<Duration>, update: F) -> (Option<V>, V)
    where
        F: FnOnce(Option<&V>) -> V,
    {
        let now = Instant::now();
        let mut cache = self.inner.lock().await;
        let live = cache.get(&key).filter(|entry| entry.is_live(now));

        let previous = live.map(|entry| entry.value.clone());
        let expires_at = match live {
            Some(entry) => entry.expires_at,
            None => ttl.map(|duration| now + duration),
        };
        let value = update(previous.as_ref());

        debug!("Cache UPSERT for key: {:?}", key);
        cache.insert(
            key,
            CacheValue {
                value: value.clone(),
                expires_at,
            },
        );
        (previous, value)
    }

    /// Drops every expired entry, returning how many were removed.
    pub async fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut cache = self.inner.lock().await;
        let before = cache.len();
        cache.retain(|_, entry| entry.is_live(now));
        let evicted = before - cache.len();
        if evicted > 0 {
            debug!(evicted, "Cache EVICT expired entries");
        }
        evicted
    }

    /// Number of stored entries, including expired ones not yet evicted.
    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug,
    V: Clone + Send + Sync,
{
    /// Creates a new MemoryCache instance with default settings
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        if let Some(entry) = cache.get(key) {
            if !entry.is_live(Instant::now()) {
                debug!("Cache entry expired for key: {:?}", key);
                cache.remove(key);
                return None;
            }
            debug!("Cache HIT for key: {:?}", key);
            return Some(entry.value.clone());
        }
        debug!("Cache MISS for key: {:?}", key);
        None
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let cache_value = CacheValue { value, expires_at };

        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, cache_value);
    }
}
