use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::config::AppConfig;
use crate::core::geo::GeoLocator;
use crate::core::history::{NoopRateRecorder, RateRecorder};
use crate::core::rates::RateFetcher;
use crate::exchange::{ExchangeResolver, RateCache, UsageLimiter};
use crate::providers::{ExchangeApiFetcher, GeoChain, IpApiGeoLocator, StaticGeoLocator};
use crate::store::DiskRateHistory;

/// Process-wide services shared by every request handler.
///
/// Built once at startup; clones share the same caches and counters.
#[derive(Clone)]
pub struct AppState {
    pub resolver: ExchangeResolver,
    pub limiter: UsageLimiter,
    pub geo: Arc<dyn GeoLocator>,
    pub history: Arc<dyn RateRecorder>,
}

impl AppState {
    pub fn new(
        resolver: ExchangeResolver,
        limiter: UsageLimiter,
        geo: Arc<dyn GeoLocator>,
        history: Arc<dyn RateRecorder>,
    ) -> Self {
        Self {
            resolver,
            limiter,
            geo,
            history,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher: Arc<dyn RateFetcher> = Arc::new(ExchangeApiFetcher::new(
            &config.providers.primary.base_url,
            &config.providers.secondary.base_url,
            config.provider_timeout(),
        )?);
        let resolver = ExchangeResolver::new(RateCache::new(config.rate_ttl()), fetcher);
        let limiter = UsageLimiter::new(config.usage_window(), config.limits.max_requests);

        let mut geo = GeoChain::new().with(Arc::new(StaticGeoLocator::new(
            config.geo.overrides.clone(),
        )));
        if let Some(base_url) = &config.geo.base_url {
            geo = geo.with(Arc::new(IpApiGeoLocator::new(
                base_url,
                config.provider_timeout(),
            )?));
        }

        let history: Arc<dyn RateRecorder> = if config.history.enabled {
            let data_path = config.default_data_path()?;
            match DiskRateHistory::open(&data_path) {
                Ok(store) => {
                    info!(path = %data_path.display(), "Recording rate history");
                    Arc::new(store)
                }
                Err(e) => {
                    warn!(error = %e, "Rate history unavailable, continuing without it");
                    Arc::new(NoopRateRecorder)
                }
            }
        } else {
            Arc::new(NoopRateRecorder)
        };

        Ok(Self::new(resolver, limiter, Arc::new(geo), history))
    }
}

