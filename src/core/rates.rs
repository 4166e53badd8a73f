//! Exchange rate snapshots and the upstream fetch abstraction

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// Message surfaced when neither upstream provider produced a rate table.
pub const UPSTREAM_FAILURE: &str = "Failed to fetch exchange data";

/// Errors raised while resolving exchange rates.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExchangeError {
    /// Both rate providers failed or reported non-success.
    #[error("{0}")]
    Upstream(String),

    /// A rate table could not be produced for an otherwise valid request.
    #[error("{0}")]
    Unavailable(String),
}

/// Rates for one base currency as published by an upstream provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub base_currency: String,
    pub rates: HashMap<String, f64>,
    /// Instant after which upstream considers this table stale. `None` when
    /// the provider did not publish one.
    pub next_update: Option<DateTime<Utc>>,
}

impl RateSnapshot {
    pub fn new(
        base_currency: &str,
        rates: HashMap<String, f64>,
        next_update: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            base_currency: base_currency.to_uppercase(),
            rates,
            next_update,
        }
    }

    /// Conversion factor from the base currency to `code`.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// True when `next_update` is at most `margin` away from `now` (or past).
    pub fn is_stale_at(&self, now: DateTime<Utc>, margin: chrono::Duration) -> bool {
        match self.next_update {
            Some(next) => next.signed_duration_since(now) <= margin,
            None => false,
        }
    }
}

/// Fetches a fresh rate table for a base currency from upstream.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch(&self, base_currency: &str) -> Result<RateSnapshot, ExchangeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn snapshot(next_update: Option<DateTime<Utc>>) -> RateSnapshot {
        RateSnapshot::new("usd", HashMap::from([("EUR".to_string(), 0.9)]), next_update)
    }

    #[test]
    fn test_base_currency_is_uppercased() {
        assert_eq!(snapshot(None).base_currency, "USD");
    }

    #[test]
    fn test_staleness_margin() {
        let now = Utc::now();
        let margin = Duration::milliseconds(100);

        assert!(snapshot(Some(now - Duration::seconds(1))).is_stale_at(now, margin));
        assert!(snapshot(Some(now + Duration::milliseconds(100))).is_stale_at(now, margin));
        assert!(!snapshot(Some(now + Duration::milliseconds(101))).is_stale_at(now, margin));
        assert!(!snapshot(None).is_stale_at(now, margin));
    }
}
