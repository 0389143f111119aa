//! Cache service trait and error types.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
    #[error("Cache operation error: {0}")]
    Operation(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_connection_refusal() {
            Self::Connection(e.to_string())
        } else {
            Self::Operation(e.to_string())
        }
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store with TTL used for redirects, click counters and rate windows.
///
/// Implementations must be safe for concurrent use. Errors are returned to the
/// caller: each call site decides whether a cache failure is terminal
/// (creation), degrades to the durable store (redirect), or is only logged
/// (click counter, rate limiter).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached destination for a short code.
    ///
    /// `Ok(None)` is a cache miss, not an error.
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Stores a short code mapping with the given TTL.
    async fn set_url(&self, short_code: &str, long_url: &str, ttl_seconds: u64)
    -> CacheResult<()>;

    /// Removes a cached mapping.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Atomically increments the click counter for a code and returns the new value.
    async fn increment_clicks(&self, short_code: &str) -> CacheResult<i64>;

    /// Reads the current request count of a rate window. Missing windows count as zero.
    async fn rate_window_count(&self, client_key: &str) -> CacheResult<u64>;

    /// Increments a rate window and (re)sets its expiry in one atomic round-trip.
    ///
    /// Returns the count after the increment.
    async fn incr_rate_window(&self, client_key: &str, window_seconds: u64) -> CacheResult<u64>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;
}
