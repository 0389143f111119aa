//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces used by the application layer, providing
//! concrete implementations for persistence, caching and outbound HTTP.
//!
//! # Modules
//!
//! - [`cache`] - Redis fast lookup tier
//! - [`metadata`] - Page title fetching for new links
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod metadata;
pub mod persistence;
