//! Short code resolution and click tracking.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::workers::click_worker::ClickRecorder;

/// A resolved short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub long_url: String,
    /// Store id of the link; `None` if the store could not supply it.
    pub url_id: Option<i64>,
    pub cache_hit: bool,
}

/// Request metadata recorded with a click.
#[derive(Debug, Clone, Default)]
pub struct Visitor {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// Resolves short codes cache-first and records visits.
pub struct RedirectService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    clicks: ClickRecorder,
    cache_ttl_seconds: u64,
}

impl RedirectService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        clicks: ClickRecorder,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            links,
            cache,
            clicks,
            cache_ttl_seconds,
        }
    }

    /// Resolves `short_code` and tracks the visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown or disabled codes and
    /// [`AppError::Internal`] if the store lookup fails on a cache miss.
    pub async fn redirect(&self, short_code: &str, visitor: Visitor) -> Result<Resolution, AppError> {
        let resolution = self.resolve(short_code).await?;
        self.track(short_code, &resolution, visitor).await;
        Ok(resolution)
    }

    /// Looks up the destination, cache first.
    ///
    /// A cache hit still asks the store for the link id so the click can be
    /// attributed; failure there only loses the durable click record. A cache
    /// read error is treated as a miss.
    pub async fn resolve(&self, short_code: &str) -> Result<Resolution, AppError> {
        match self.cache.get_url(short_code).await {
            Ok(Some(long_url)) if !long_url.is_empty() => {
                metrics::counter!("cache_hits_total").increment(1);

                let url_id = match self.links.find_id_by_code(short_code).await {
                    Ok(Some(id)) => Some(id),
                    Ok(None) => {
                        warn!(short_code = %short_code, "Cached code missing from database");
                        None
                    }
                    Err(e) => {
                        warn!(short_code = %short_code, error = %e, "Database unavailable for URL ID lookup");
                        None
                    }
                };

                Ok(Resolution {
                    long_url,
                    url_id,
                    cache_hit: true,
                })
            }
            Ok(_) => {
                metrics::counter!("cache_misses_total").increment(1);
                self.resolve_from_store(short_code).await
            }
            Err(e) => {
                metrics::counter!("cache_misses_total").increment(1);
                warn!(short_code = %short_code, error = %e, "Cache read failed, falling back to database");
                self.resolve_from_store(short_code).await
            }
        }
    }

    async fn resolve_from_store(&self, short_code: &str) -> Result<Resolution, AppError> {
        let link = self
            .links
            .find_active_by_code(short_code)
            .await
            .map_err(|e| {
                error!(short_code = %short_code, error = %e, "Database error during redirect");
                AppError::internal("Failed to retrieve URL", json!({}))
            })?
            .ok_or_else(|| {
                AppError::not_found(
                    "Short URL not found",
                    json!({ "short_code": short_code }),
                )
            })?;

        if let Err(e) = self
            .cache
            .set_url(short_code, &link.long_url, self.cache_ttl_seconds)
            .await
        {
            warn!(short_code = %short_code, error = %e, "Failed to repopulate cache");
        }

        Ok(Resolution {
            long_url: link.long_url,
            url_id: Some(link.id),
            cache_hit: false,
        })
    }

    /// Queues a durable click record (when the link id is known) and bumps the
    /// cached click counter. Neither failure affects the redirect.
    pub async fn track(&self, short_code: &str, resolution: &Resolution, visitor: Visitor) {
        if let Some(url_id) = resolution.url_id {
            self.clicks.record_async(ClickEvent {
                url_id,
                ip: visitor.ip,
                user_agent: visitor.user_agent,
                referer: visitor.referer,
            });
        }

        match self.cache.increment_clicks(short_code).await {
            Ok(count) => debug!(short_code = %short_code, count, "Click counted"),
            Err(e) => warn!(short_code = %short_code, error = %e, "Failed to increment click counter"),
        }
    }
}
