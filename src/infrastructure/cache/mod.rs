//! Fast lookup tier backed by Redis.
//!
//! Provides the [`CacheService`] trait and its production implementation,
//! [`RedisCache`]. The cache holds three kinds of keys:
//!
//! - `url:{code}` - short code to destination URL, with a TTL
//! - `clicks:{code}` - approximate per-code click counter, no TTL
//! - `rate_limit:{client}` - fixed-window request counter, TTL = window

mod redis_cache;
mod service;

pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;
