//! Geolocation abstraction

use async_trait::async_trait;

#[async_trait]
pub trait GeoLocator: Send + Sync {
    /// ISO-3166 alpha-2 country code for `ip`, if it can be determined.
    async fn country(&self, ip: &str) -> Option<String>;

    /// Drops expired cached lookups, returning how many were removed.
    async fn evict_expired(&self) -> usize {
        0
    }
}
