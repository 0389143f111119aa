//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};

/// A click record in the append-only click log.
///
/// Records are never mutated or deleted.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: i64,
    pub url_id: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

/// Input data for recording a new click.
///
/// The timestamp is set by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClick {
    pub url_id: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}
