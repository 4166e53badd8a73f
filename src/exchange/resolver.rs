use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::rate_cache::RateCache;
use crate::core::rates::{ExchangeError, RateFetcher, RateSnapshot};

/// Snapshots whose `next_update` is this close (or past) are refetched.
pub const STALE_MARGIN_MS: i64 = 100;

/// Resolves the rate table for a base currency from the cache, fetching on a
/// miss or when upstream's next update is due.
///
/// The check-then-refresh sequence is not serialized per key: concurrent
/// callers for the same stale currency may each fetch, and the last write
/// wins.
#[derive(Clone)]
pub struct ExchangeResolver {
    cache: RateCache,
    fetcher: Arc<dyn RateFetcher>,
}

impl ExchangeResolver {
    pub fn new(cache: RateCache, fetcher: Arc<dyn RateFetcher>) -> Self {
        Self { cache, fetcher }
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    #[instrument(name = "ResolveRates", skip(self), fields(base = %base_currency))]
    pub async fn resolve(
        &self,
        base_currency: &str,
    ) -> Result<Option<Arc<RateSnapshot>>, ExchangeError> {
        let base = base_currency.to_uppercase();

        let mut snapshot = self.cache.get(&base).await;
        if snapshot.is_none() {
            debug!("No cached rates, fetching");
            self.refresh(&base).await?;
            snapshot = self.cache.get(&base).await;
        }

        let margin = chrono::Duration::milliseconds(STALE_MARGIN_MS);
        if snapshot
            .as_ref()
            .is_some_and(|s| s.is_stale_at(Utc::now(), margin))
        {
            debug!("Cached rates are due for update, refetching");
            self.refresh(&base).await?;
            snapshot = self.cache.get(&base).await;
        }

        Ok(snapshot)
    }

    async fn refresh(&self, base: &str) -> Result<(), ExchangeError> {
        let fresh = self.fetcher.fetch(base).await?;
        self.cache.put(base, fresh).await;
        Ok(())
    }
}
