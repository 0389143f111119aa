//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::services::{LinkService, RateLimiter, RedirectService};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;

/// Services and infrastructure handles shared by every request.
///
/// Cloned per request by axum; all fields are reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub redirect_service: Arc<RedirectService>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Used by the health check.
    pub links: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
    /// Read client addresses from proxy headers instead of the peer socket.
    pub behind_proxy: bool,
}
