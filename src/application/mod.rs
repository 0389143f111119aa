//! Application layer services implementing business logic.
//!
//! Services consume repository and cache traits, which are injected as
//! `Arc<dyn Trait>` so tests can substitute doubles.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation and listing
//! - [`services::redirect_service::RedirectService`] - Cache-then-store resolution and click tracking
//! - [`services::rate_limiter::RateLimiter`] - Fixed-window rate limiting

pub mod services;
