//! Repository trait for short link data access.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the authoritative short code mapping.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists.
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on database errors.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds an active link by its short code.
    ///
    /// Inactive links are treated as absent.
    async fn find_active_by_code(&self, short_code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Looks up only the id of a link, regardless of its active flag.
    ///
    /// Used on the cache-hit redirect path to attribute click events.
    async fn find_id_by_code(&self, short_code: &str) -> Result<Option<i64>, AppError>;

    /// Lists the most recent links of an owner, newest first.
    async fn list_by_owner(&self, owner_id: i64, limit: i64) -> Result<Vec<ShortLink>, AppError>;

    /// Sets the page title fetched for a link.
    async fn update_title(&self, id: i64, title: &str) -> Result<(), AppError>;

    /// Soft-disables a link.
    ///
    /// Returns `Ok(false)` if no active link matched.
    async fn deactivate(&self, short_code: &str) -> Result<bool, AppError>;

    /// Checks database connectivity.
    async fn health_check(&self) -> bool;
}
