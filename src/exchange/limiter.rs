use std::time::Duration;

use crate::store::memory::MemoryCache;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_CAPACITY: u32 = 30;

/// Admitted requests in the current window. The window itself is the
/// entry's lifetime in the backing cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageRecord {
    pub count: u32,
}

/// Outcome of a single admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub allowed: bool,
    /// Requests admitted in the window before this attempt.
    pub count: u32,
}

/// Fixed-window request counter per client key.
///
/// A window opens with the first request from a key and closes `window`
/// later regardless of further traffic. Rejected requests are not counted.
#[derive(Clone)]
pub struct UsageLimiter {
    records: MemoryCache<String, UsageRecord>,
    window: Duration,
    capacity: u32,
}

impl UsageLimiter {
    pub fn new(window: Duration, capacity: u32) -> Self {
        Self {
            records: MemoryCache::new(),
            window,
            capacity,
        }
    }

    pub async fn admit(&self, client_key: &str) -> Admission {
        let capacity = self.capacity;
        let (previous, _) = self
            .records
            .upsert_with(client_key.to_string(), Some(self.window), |current| {
                match current {
                    Some(record) if record.count >= capacity => *record,
                    Some(record) => UsageRecord {
                        count: record.count + 1,
                    },
                    None => UsageRecord { count: 1 },
                }
            })
            .await;

        let count = previous.map_or(0, |record| record.count);
        Admission {
            allowed: count < capacity,
            count,
        }
    }

    pub async fn evict_expired(&self) -> usize {
        self.records.evict_expired().await
    }
}

impl Default for UsageLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_thirty_first_request_is_rejected() {
        let limiter = UsageLimiter::default();

        for i in 0..30 {
            let admission = limiter.admit("192.0.2.1").await;
            assert!(admission.allowed, "request {} should be admitted", i + 1);
            assert_eq!(admission.count, i);
        }

        let rejected = limiter.admit("192.0.2.1").await;
        assert!(!rejected.allowed);
        assert_eq!(rejected.count, 30);

        // Rejections are not counted further
        assert_eq!(limiter.admit("192.0.2.1").await.count, 30);

        // Other keys are unaffected
        assert!(limiter.admit("198.51.100.7").await.allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_is_fixed_from_first_request() {
        let limiter = UsageLimiter::new(Duration::from_secs(60), 2);

        assert!(limiter.admit("ip").await.allowed);
        advance(Duration::from_secs(50)).await;
        assert!(limiter.admit("ip").await.allowed);
        assert!(!limiter.admit("ip").await.allowed);

        // 60 seconds after the first request, not the last, the window resets
        advance(Duration::from_secs(11)).await;
        let admission = limiter.admit("ip").await;
        assert!(admission.allowed);
        assert_eq!(admission.count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_windows_are_evicted() {
        let limiter = UsageLimiter::default();
        limiter.admit("a").await;
        limiter.admit("b").await;

        advance(Duration::from_secs(61)).await;
        assert_eq!(limiter.evict_expired().await, 2);
    }
}
