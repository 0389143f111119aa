//! Business logic services for the application layer.

pub mod link_service;
pub mod rate_limiter;
pub mod redirect_service;

pub use link_service::{CreateLink, CreatedLink, LinkService};
pub use rate_limiter::RateLimiter;
pub use redirect_service::{RedirectService, Resolution, Visitor};
