//! Link creation and listing service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{NewShortLink, ShortLink, link::short_url_for};
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{generate_code, validate_custom_code};
use crate::workers::metadata_worker::{MetadataDispatcher, MetadataJob};

/// Maximum number of links returned when listing a user's links.
pub const LIST_LIMIT: i64 = 100;

/// Input for creating a short link.
#[derive(Debug, Clone)]
pub struct CreateLink {
    pub long_url: String,
    pub username: String,
    pub custom_code: Option<String>,
}

/// Outcome of a successful creation.
///
/// `id` is `None` when the link could only be written to the cache because the
/// durable store was unavailable.
#[derive(Debug, Clone)]
pub struct CreatedLink {
    pub id: Option<i64>,
    pub short_code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
}

impl CreatedLink {
    pub fn short_url(&self) -> String {
        short_url_for(&self.short_code)
    }
}

/// Service for creating and listing short links.
///
/// The cache is the mandatory tier on creation and the store is best effort:
/// a link whose store insert failed for infrastructure reasons still redirects
/// from the cache until its TTL expires.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    users: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheService>,
    metadata: MetadataDispatcher,
    cache_ttl_seconds: u64,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        users: Arc<dyn UserRepository>,
        cache: Arc<dyn CacheService>,
        metadata: MetadataDispatcher,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            links,
            users,
            cache,
            metadata,
            cache_ttl_seconds,
        }
    }

    /// Creates a short link.
    ///
    /// # Flow
    ///
    /// 1. Use the custom code if non-empty and valid, otherwise generate one
    /// 2. Get or create the owner (a failure continues without an owner)
    /// 3. Reject with a conflict if the code is already cached
    /// 4. Write the mapping to the cache (mandatory)
    /// 5. Insert into the store (best effort); a uniqueness violation removes
    ///    the cache entry again and returns a conflict
    /// 6. Queue a title fetch if the store assigned an id
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the custom code is invalid.
    /// Returns [`AppError::Conflict`] if the short code already exists.
    /// Returns [`AppError::Internal`] if the cache write fails.
    pub async fn create_short_link(&self, request: CreateLink) -> Result<CreatedLink, AppError> {
        let CreateLink {
            long_url,
            username,
            custom_code,
        } = request;

        let short_code = match custom_code.filter(|c| !c.is_empty()) {
            Some(custom) => {
                validate_custom_code(&custom)?;
                custom
            }
            None => generate_code(),
        };

        let owner_id = match self.users.get_or_create(&username).await {
            Ok(user) => Some(user.id),
            Err(e) => {
                warn!(username = %username, error = %e, "Database unavailable for user creation, continuing without owner");
                None
            }
        };

        match self.cache.get_url(&short_code).await {
            Ok(Some(existing)) if !existing.is_empty() => {
                return Err(short_code_conflict(&short_code));
            }
            Ok(_) => {}
            Err(e) => {
                warn!(short_code = %short_code, error = %e, "Cache lookup failed during creation");
            }
        }

        self.cache
            .set_url(&short_code, &long_url, self.cache_ttl_seconds)
            .await
            .map_err(|e| {
                warn!(short_code = %short_code, error = %e, "Failed to cache URL");
                AppError::internal("Failed to create short URL", json!({}))
            })?;

        let new_link = NewShortLink {
            short_code: short_code.clone(),
            long_url: long_url.clone(),
            owner_id,
        };

        let stored = match self.links.create(new_link).await {
            Ok(link) => Some(link),
            Err(AppError::Conflict { .. }) => {
                if let Err(e) = self.cache.invalidate(&short_code).await {
                    warn!(short_code = %short_code, error = %e, "Failed to roll back cache entry");
                }
                return Err(short_code_conflict(&short_code));
            }
            Err(e) => {
                warn!(
                    short_code = %short_code,
                    ttl_seconds = self.cache_ttl_seconds,
                    error = %e,
                    "Database unavailable, URL served from cache only"
                );
                None
            }
        };

        let created = match stored {
            Some(link) => {
                self.metadata.dispatch(MetadataJob {
                    url_id: link.id,
                    long_url: link.long_url.clone(),
                });

                CreatedLink {
                    id: Some(link.id),
                    short_code: link.short_code,
                    long_url: link.long_url,
                    created_at: link.created_at,
                }
            }
            None => CreatedLink {
                id: None,
                short_code,
                long_url,
                created_at: Utc::now(),
            },
        };

        info!(short_code = %created.short_code, id = ?created.id, "Short link created");
        Ok(created)
    }

    /// Lists up to [`LIST_LIMIT`] of a user's links, newest first.
    ///
    /// Store failures yield an empty list instead of an error.
    pub async fn list_links(&self, username: &str) -> Vec<ShortLink> {
        let user = match self.users.get_or_create(username).await {
            Ok(user) => user,
            Err(e) => {
                warn!(username = %username, error = %e, "Database unavailable for listing URLs");
                return Vec::new();
            }
        };

        match self.links.list_by_owner(user.id, LIST_LIMIT).await {
            Ok(links) => {
                debug!(username = %username, count = links.len(), "Listed links");
                links
            }
            Err(e) => {
                warn!(username = %username, error = %e, "Database unavailable for query");
                Vec::new()
            }
        }
    }
}

fn short_code_conflict(short_code: &str) -> AppError {
    AppError::conflict(
        "Short code already exists",
        json!({ "short_code": short_code }),
    )
}
