//! Expiring key/value cache abstraction

use async_trait::async_trait;
use std::time::Duration;

/// A key/value store whose entries may carry a time-to-live.
///
/// Implementations must be safe to share across concurrent requests; a reader
/// either sees the previous value or the new one, never a partial write.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    /// Returns the live value for `key`, or `None` when absent or expired.
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores `value`, replacing any previous entry. `ttl` of `None` never expires.
    async fn put(&self, key: K, value: V, ttl: Option<Duration>);
}
