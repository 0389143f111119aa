//! Fixed-window rate limiting backed by the cache.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::infrastructure::cache::CacheService;

/// Per-client fixed-window request limiter.
///
/// The window counter lives in the shared cache so limits hold across
/// instances. Only accepted requests increment the counter, and every accepted
/// request refreshes the window TTL. Cache failures fail open.
pub struct RateLimiter {
    cache: Arc<dyn CacheService>,
    limit: u64,
    window_seconds: u64,
}

impl RateLimiter {
    pub fn new(cache: Arc<dyn CacheService>, limit: u64, window_seconds: u64) -> Self {
        Self {
            cache,
            limit,
            window_seconds,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    /// Checks `client_key` against the configured limit and window.
    pub async fn allow(&self, client_key: &str) -> bool {
        self.allow_with(client_key, self.limit, self.window_seconds)
            .await
    }

    /// Returns `false` once `client_key` has `limit` accepted requests in the
    /// current window.
    pub async fn allow_with(&self, client_key: &str, limit: u64, window_seconds: u64) -> bool {
        let count = match self.cache.rate_window_count(client_key).await {
            Ok(count) => count,
            Err(e) => {
                warn!(client = %client_key, error = %e, "Rate limit read failed, allowing request");
                0
            }
        };

        if count >= limit {
            warn!(client = %client_key, count, limit, "Rate limit exceeded");
            metrics::counter!("rate_limited_total").increment(1);
            return false;
        }

        match self.cache.incr_rate_window(client_key, window_seconds).await {
            Ok(count) => debug!(client = %client_key, count, limit, "Rate window updated"),
            Err(e) => warn!(client = %client_key, error = %e, "Failed to update rate window"),
        }

        true
    }
}
