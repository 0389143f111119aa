//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

const URL_PREFIX: &str = "url:";
const CLICKS_PREFIX: &str = "clicks:";
const RATE_LIMIT_PREFIX: &str = "rate_limit:";

/// Redis cache implementation for redirects, click counters and rate windows.
///
/// `ConnectionManager` multiplexes one connection across all request tasks and
/// reconnects transparently; cloning it is cheap.
pub struct RedisCache {
    client: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the connection cannot
    /// be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self { client: manager })
    }

    fn url_key(short_code: &str) -> String {
        format!("{}{}", URL_PREFIX, short_code)
    }

    fn clicks_key(short_code: &str) -> String {
        format!("{}{}", CLICKS_PREFIX, short_code)
    }

    fn rate_key(client_key: &str) -> String {
        format!("{}{}", RATE_LIMIT_PREFIX, client_key)
    }

    /// EXPIRE takes a signed value and deletes the key when it is negative.
    fn expiry_seconds(window_seconds: u64) -> CacheResult<i64> {
        i64::try_from(window_seconds).map_err(|_| {
            CacheError::Operation(format!("Rate window of {}s is out of range", window_seconds))
        })
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let key = Self::url_key(short_code);
        let mut conn = self.client.clone();

        let url = conn.get::<_, Option<String>>(&key).await?;
        match &url {
            Some(_) => debug!(key = %key, "Cache HIT"),
            None => debug!(key = %key, "Cache MISS"),
        }

        Ok(url)
    }

    async fn set_url(
        &self,
        short_code: &str,
        long_url: &str,
        ttl_seconds: u64,
    ) -> CacheResult<()> {
        let key = Self::url_key(short_code);
        let mut conn = self.client.clone();

        conn.set_ex::<_, _, ()>(&key, long_url, ttl_seconds)
            .await
            .inspect_err(|e| warn!(key = %key, error = %e, "Redis SET failed"))?;

        debug!(key = %key, ttl_seconds, "Cache SET");
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let key = Self::url_key(short_code);
        let mut conn = self.client.clone();

        let deleted = conn
            .del::<_, i64>(&key)
            .await
            .inspect_err(|e| warn!(key = %key, error = %e, "Redis DEL failed"))?;

        if deleted > 0 {
            debug!(key = %key, "Cache INVALIDATE");
        }
        Ok(())
    }

    async fn increment_clicks(&self, short_code: &str) -> CacheResult<i64> {
        let key = Self::clicks_key(short_code);
        let mut conn = self.client.clone();

        let count = conn.incr::<_, _, i64>(&key, 1).await?;
        debug!(key = %key, count, "Click counter incremented");

        Ok(count)
    }

    async fn rate_window_count(&self, client_key: &str) -> CacheResult<u64> {
        let key = Self::rate_key(client_key);
        let mut conn = self.client.clone();

        let count = conn.get::<_, Option<u64>>(&key).await?.unwrap_or(0);
        debug!(key = %key, count, "Rate window read");

        Ok(count)
    }

    async fn incr_rate_window(&self, client_key: &str, window_seconds: u64) -> CacheResult<u64> {
        let key = Self::rate_key(client_key);
        let expiry = Self::expiry_seconds(window_seconds)?;
        let mut conn = self.client.clone();

        // MULTI/EXEC keeps INCR and EXPIRE in one transaction.
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .expire(&key, expiry)
            .ignore()
            .query_async(&mut conn)
            .await?;

        debug!(key = %key, count, window_seconds, "Rate window incremented");
        Ok(count)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
