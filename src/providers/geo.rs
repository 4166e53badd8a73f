use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::geo::GeoLocator;
use crate::store::memory::MemoryCache;

const LOOKUP_TTL: Duration = Duration::from_secs(60 * 60);

/// Fixed IP to country assignments.
#[derive(Debug, Default)]
pub struct StaticGeoLocator {
    countries: HashMap<String, String>,
}

impl StaticGeoLocator {
    pub fn new(countries: HashMap<String, String>) -> Self {
        Self {
            countries: countries
                .into_iter()
                .map(|(ip, country)| (ip, country.to_uppercase()))
                .collect(),
        }
    }
}

#[async_trait]
impl GeoLocator for StaticGeoLocator {
    async fn country(&self, ip: &str) -> Option<String> {
        self.countries.get(ip).cloned()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: Option<String>,
    #[serde(rename = "countryCode", alias = "country_code")]
    country_code: Option<String>,
}

/// Looks up countries through an ip-api.com style JSON endpoint.
pub struct IpApiGeoLocator {
    base_url: String,
    client: reqwest::Client,
    cache: MemoryCache<String, Option<String>>,
}

impl IpApiGeoLocator {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("foreignrate/0.1")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            cache: MemoryCache::new(),
        })
    }

    async fn lookup(&self, ip: &str) -> Result<Option<String>> {
        let url = format!("{}/{}", self.base_url, ip);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for ip: {}", e, ip))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for ip: {}", response.status(), ip));
        }

        let data: IpApiResponse = response.json().await?;
        if data.status.as_deref().is_some_and(|s| s != "success") {
            return Ok(None);
        }
        Ok(data
            .country_code
            .filter(|c| !c.is_empty())
            .map(|c| c.to_uppercase()))
    }
}

#[async_trait]
impl GeoLocator for IpApiGeoLocator {
    #[instrument(name = "GeoLookup", skip(self), fields(ip = %ip))]
    async fn country(&self, ip: &str) -> Option<String> {
        if let Some(cached) = self.cache.get(&ip.to_string()).await {
            return cached;
        }

        match self.lookup(ip).await {
            Ok(country) => {
                self.cache
                    .put(ip.to_string(), country.clone(), Some(LOOKUP_TTL))
                    .await;
                country
            }
            Err(e) => {
                // Not cached so the next request retries the lookup
                debug!(error = %e, "Geolocation lookup failed");
                None
            }
        }
    }

    async fn evict_expired(&self) -> usize {
        self.cache.evict_expired().await
    }
}

/// Asks each locator in order; the first country found wins.
#[derive(Default)]
pub struct GeoChain {
    locators: Vec<Arc<dyn GeoLocator>>,
}

impl GeoChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, locator: Arc<dyn GeoLocator>) -> Self {
        self.locators.push(locator);
        self
    }
}

#[async_trait]
impl GeoLocator for GeoChain {
    async fn country(&self, ip: &str) -> Option<String> {
        for locator in &self.locators {
            if let Some(country) = locator.country(ip).await {
                return Some(country);
            }
        }
        None
    }

    async fn evict_expired(&self) -> usize {
        let mut evicted = 0;
        for locator in &self.locators {
            evicted += locator.evict_expired().await;
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_static_locator() {
        let locator =
            StaticGeoLocator::new(HashMap::from([("127.0.0.1".to_string(), "ng".to_string())]));
        assert_eq!(locator.country("127.0.0.1").await.as_deref(), Some("NG"));
        assert!(locator.country("10.0.0.1").await.is_none());
    }

    #[tokio::test]
    async fn test_ip_api_lookup_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/8.8.8.8"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"status": "success", "countryCode": "US"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let locator =
            IpApiGeoLocator::new(&format!("{}/json/", server.uri()), Duration::from_secs(5))
                .unwrap();
        assert_eq!(locator.country("8.8.8.8").await.as_deref(), Some("US"));
        assert_eq!(locator.country("8.8.8.8").await.as_deref(), Some("US"));
    }

    #[tokio::test]
    async fn test_ip_api_lookups_are_evicted_after_ttl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"status": "success", "countryCode": "GB"}"#),
            )
            .mount(&server)
            .await;

        let locator = Arc::new(
            IpApiGeoLocator::new(&format!("{}/json", server.uri()), Duration::from_secs(5))
                .unwrap(),
        );
        locator.country("81.2.69.160").await;
        locator.country("81.2.69.161").await;

        let chain = GeoChain::new().with(locator);
        assert_eq!(chain.evict_expired().await, 0);

        tokio::time::pause();
        tokio::time::advance(LOOKUP_TTL + Duration::from_secs(1)).await;
        assert_eq!(chain.evict_expired().await, 2);
    }

    #[tokio::test]
    async fn test_ip_api_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/10.0.0.1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"status": "fail", "message": "private range"}"#),
            )
            .mount(&server)
            .await;

        let locator =
            IpApiGeoLocator::new(&format!("{}/json", server.uri()), Duration::from_secs(5))
                .unwrap();
        assert!(locator.country("10.0.0.1").await.is_none());
    }

    #[tokio::test]
    async fn test_chain_prefers_first_locator() {
        let first =
            StaticGeoLocator::new(HashMap::from([("1.1.1.1".to_string(), "AU".to_string())]));
        let second = StaticGeoLocator::new(HashMap::from([
            ("1.1.1.1".to_string(), "US".to_string()),
            ("2.2.2.2".to_string(), "FR".to_string()),
        ]));
        let chain = GeoChain::new()
            .with(Arc::new(first))
            .with(Arc::new(second));

        assert_eq!(chain.country("1.1.1.1").await.as_deref(), Some("AU"));
        assert_eq!(chain.country("2.2.2.2").await.as_deref(), Some("FR"));
        assert!(chain.country("3.3.3.3").await.is_none());
    }
}
