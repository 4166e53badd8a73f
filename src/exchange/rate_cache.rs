use std::sync::Arc;
use std::time::Duration;

use crate::core::cache::Cache;
use crate::core::rates::RateSnapshot;
use crate::store::memory::MemoryCache;

/// Default lifetime of a cached snapshot, measured from insertion.
pub const DEFAULT_RATE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Rate snapshots keyed by uppercase base currency.
///
/// Snapshots are shared immutably; a refresh replaces the whole entry.
#[derive(Clone)]
pub struct RateCache {
    store: MemoryCache<String, Arc<RateSnapshot>>,
    ttl: Duration,
}

impl RateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: MemoryCache::new(),
            ttl,
        }
    }

    pub async fn get(&self, base_currency: &str) -> Option<Arc<RateSnapshot>> {
        self.store.get(&base_currency.to_uppercase()).await
    }

    pub async fn put(&self, base_currency: &str, snapshot: RateSnapshot) {
        self.store
            .put(
                base_currency.to_uppercase(),
                Arc::new(snapshot),
                Some(self.ttl),
            )
            .await;
    }

    pub async fn evict_expired(&self) -> usize {
        self.store.evict_expired().await
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::time::advance;

    fn snapshot(base: &str) -> RateSnapshot {
        RateSnapshot::new(base, HashMap::from([("EUR".to_string(), 0.9)]), None)
    }

    #[tokio::test]
    async fn test_keys_are_case_insensitive() {
        let cache = RateCache::default();
        cache.put("usd", snapshot("usd")).await;

        let cached = cache.get("USD").await.unwrap();
        assert_eq!(cached.base_currency, "USD");
        assert!(cache.get("EUR").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = RateCache::new(Duration::from_secs(60));
        cache.put("USD", snapshot("USD")).await;

        advance(Duration::from_secs(59)).await;
        assert!(cache.get("USD").await.is_some());

        advance(Duration::from_secs(2)).await;
        assert!(cache.get("USD").await.is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_snapshot() {
        let cache = RateCache::default();
        cache.put("USD", snapshot("USD")).await;
        let first = cache.get("USD").await.unwrap();

        let mut rates = HashMap::new();
        rates.insert("EUR".to_string(), 0.95);
        cache.put("USD", RateSnapshot::new("USD", rates, None)).await;

        assert_eq!(first.rate("EUR"), Some(0.9));
        assert_eq!(cache.get("USD").await.unwrap().rate("EUR"), Some(0.95));
    }
}
