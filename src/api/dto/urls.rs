//! DTOs for link creation and listing endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::application::services::CreatedLink;
use crate::domain::entities::ShortLink;
use crate::utils::code_generator::validate_custom_code;

/// Request to create a short link.
///
/// An empty `custom_code` is treated the same as an absent one.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUrlRequest {
    #[validate(custom(function = "validate_http_url"))]
    pub long_url: String,

    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "validate_code_field"))]
    pub custom_code: Option<String>,
}

fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => Err(ValidationError::new("url")
            .with_message("Must be an absolute http or https URL".into())),
    }
}

fn validate_code_field(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Ok(());
    }

    validate_custom_code(code).map_err(|e| {
        ValidationError::new("custom_code").with_message(e.to_string().into())
    })
}

/// Query parameters for listing a user's links.
#[derive(Debug, Deserialize)]
pub struct ListUrlsQuery {
    pub username: Option<String>,
}

/// A short link as returned by the API.
#[derive(Debug, Serialize)]
pub struct UrlResponse {
    /// `null` when the link currently exists in the cache only.
    pub id: Option<i64>,
    pub short_code: String,
    pub long_url: String,
    pub short_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CreatedLink> for UrlResponse {
    fn from(link: CreatedLink) -> Self {
        Self {
            short_url: link.short_url(),
            id: link.id,
            short_code: link.short_code,
            long_url: link.long_url,
            title: None,
            created_at: link.created_at,
        }
    }
}

impl From<ShortLink> for UrlResponse {
    fn from(link: ShortLink) -> Self {
        Self {
            short_url: link.short_url(),
            id: Some(link.id),
            short_code: link.short_code,
            long_url: link.long_url,
            title: link.title,
            created_at: link.created_at,
        }
    }
}
