//! Click event model for asynchronous click tracking.

use crate::domain::entities::NewClick;

/// An in-memory click event handed from the redirect handler to the click worker.
///
/// All client metadata is optional to handle missing headers gracefully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub url_id: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl From<ClickEvent> for NewClick {
    fn from(event: ClickEvent) -> Self {
        Self {
            url_id: event.url_id,
            ip: event.ip,
            user_agent: event.user_agent,
            referer: event.referer,
        }
    }
}
