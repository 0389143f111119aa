//! Short link entity representing a code to URL mapping.

use chrono::{DateTime, Utc};

/// A persisted short link.
///
/// `short_code` is globally unique and immutable. `title` is filled in later by
/// the metadata worker; `is_active` is cleared to soft-disable a link.
#[derive(Debug, Clone)]
pub struct ShortLink {
    pub id: i64,
    pub short_code: String,
    pub long_url: String,
    pub owner_id: Option<i64>,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl ShortLink {
    /// Relative short URL served by this instance (`/{code}`).
    pub fn short_url(&self) -> String {
        short_url_for(&self.short_code)
    }
}

/// Builds the relative short URL for a code.
pub fn short_url_for(short_code: &str) -> String {
    format!("/{}", short_code)
}

/// Input data for inserting a new short link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub short_code: String,
    pub long_url: String,
    pub owner_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_url_is_slash_prefixed_code() {
        let link = ShortLink {
            id: 1,
            short_code: "abc123".to_string(),
            long_url: "https://example.com".to_string(),
            owner_id: None,
            title: None,
            created_at: Utc::now(),
            is_active: true,
        };

        assert_eq!(link.short_url(), "/abc123");
        assert_eq!(short_url_for("x"), "/x");
    }
}
