use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::core::rates::{ExchangeError, RateFetcher, RateSnapshot, UPSTREAM_FAILURE};

#[derive(Deserialize, Debug)]
struct LatestRatesResponse {
    result: Option<String>,
    rates: Option<HashMap<String, f64>>,
    conversion_rates: Option<HashMap<String, f64>>,
    time_next_update_unix: Option<i64>,
    time_next_update_utc: Option<String>,
}

impl LatestRatesResponse {
    fn next_update(&self) -> Option<DateTime<Utc>> {
        if let Some(ts) = self.time_next_update_unix {
            return Utc.timestamp_opt(ts, 0).single();
        }
        self.time_next_update_utc
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc2822(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Fetches latest rates from an exchangerate-api compatible primary provider,
/// falling back once to a secondary provider.
pub struct ExchangeApiFetcher {
    primary_url: String,
    secondary_url: String,
    client: reqwest::Client,
}

impl ExchangeApiFetcher {
    pub fn new(primary_url: &str, secondary_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("foreignrate/0.1")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            primary_url: primary_url.to_string(),
            secondary_url: secondary_url.to_string(),
            client,
        })
    }

    async fn fetch_from(&self, base_url: &str, base_currency: &str) -> Result<RateSnapshot> {
        let url = format!("{base_url}{base_currency}");
        debug!("Requesting latest rates from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for base currency: {}", e, base_currency))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base currency: {}",
                response.status(),
                base_currency
            ));
        }

        let text = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&text).map_err(|e| {
            anyhow!("Failed to parse JSON response for {}: {}", base_currency, e)
        })?;

        if data.result.as_deref() != Some("success") {
            return Err(anyhow!(
                "Provider reported {} for base currency: {}",
                data.result.as_deref().unwrap_or("no result"),
                base_currency
            ));
        }

        let next_update = data.next_update();
        let rates = data
            .rates
            .or(data.conversion_rates)
            .filter(|rates| !rates.is_empty())
            .ok_or_else(|| anyhow!("No rate data found for base currency: {}", base_currency))?;

        Ok(RateSnapshot::new(base_currency, rates, next_update))
    }
}

#[async_trait]
impl RateFetcher for ExchangeApiFetcher {
    #[instrument(name = "ExchangeRateFetch", skip(self), fields(base = %base_currency))]
    async fn fetch(&self, base_currency: &str) -> Result<RateSnapshot, ExchangeError> {
        let base_currency = base_currency.to_uppercase();

        match self.fetch_from(&self.primary_url, &base_currency).await {
            Ok(snapshot) => return Ok(snapshot),
            Err(e) => warn!(error = %e, "Primary provider failed, trying secondary"),
        }

        self.fetch_from(&self.secondary_url, &base_currency)
            .await
            .map_err(|e| {
                warn!(error = %e, "Secondary provider failed");
                ExchangeError::Upstream(UPSTREAM_FAILURE.to_string())
            })
    }
}
