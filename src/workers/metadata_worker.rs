//! Asynchronous page title fetching for newly stored links.

use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::repositories::LinkRepository;
use crate::infrastructure::metadata::MetadataFetcher;

/// A request to fetch and store the title of a link's destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataJob {
    pub url_id: i64,
    pub long_url: String,
}

/// Submits metadata jobs to the background metadata worker without blocking.
#[derive(Clone)]
pub struct MetadataDispatcher {
    sender: mpsc::Sender<MetadataJob>,
}

impl MetadataDispatcher {
    /// Creates a dispatcher and the receiving end for [`run_metadata_worker`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<MetadataJob>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Queues a job. Returns `false` if it was dropped.
    pub fn dispatch(&self, job: MetadataJob) -> bool {
        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) | Err(TrySendError::Closed(job)) => {
                warn!(url_id = job.url_id, "Metadata queue unavailable, skipping title fetch");
                metrics::counter!("metadata_jobs_dropped_total").increment(1);
                false
            }
        }
    }
}

/// Fetches page titles for queued links until every [`MetadataDispatcher`] is dropped.
///
/// A failed fetch leaves the title unset; an empty title is not written.
pub async fn run_metadata_worker(
    rx: mpsc::Receiver<MetadataJob>,
    links: Arc<dyn LinkRepository>,
    fetcher: Arc<dyn MetadataFetcher>,
    concurrency: usize,
) {
    super::run_bounded(rx, concurrency, "metadata", move |job: MetadataJob| {
        let links = links.clone();
        let fetcher = fetcher.clone();
        async move { process_job(job, links.as_ref(), fetcher.as_ref()).await }
    })
    .await;
}

async fn process_job(job: MetadataJob, links: &dyn LinkRepository, fetcher: &dyn MetadataFetcher) {
    let title = match fetcher.fetch_title(&job.long_url).await {
        Ok(title) => title,
        Err(e) => {
            warn!(url_id = job.url_id, url = %job.long_url, error = %e, "Failed to fetch URL metadata");
            return;
        }
    };

    if title.is_empty() {
        debug!(url_id = job.url_id, "Empty page title, nothing to store");
        return;
    }

    match links.update_title(job.url_id, &title).await {
        Ok(()) => debug!(url_id = job.url_id, title = %title, "Stored page title"),
        Err(e) => warn!(url_id = job.url_id, error = %e, "Failed to update metadata"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::metadata::{MetadataError, MockMetadataFetcher};

    fn job() -> MetadataJob {
        MetadataJob {
            url_id: 5,
            long_url: "https://example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_title_is_stored() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch_title()
            .withf(|url| url == "https://example.com")
            .times(1)
            .returning(|_| Ok("Example Domain".to_string()));

        let mut links = MockLinkRepository::new();
        links
            .expect_update_title()
            .withf(|id, title| *id == 5 && title == "Example Domain")
            .times(1)
            .returning(|_, _| Ok(()));

        process_job(job(), &links, &fetcher).await;
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_title_unset() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch_title()
            .times(1)
            .returning(|_| Err(MetadataError::Status(500)));

        let mut links = MockLinkRepository::new();
        links.expect_update_title().times(0);

        process_job(job(), &links, &fetcher).await;
    }

    #[tokio::test]
    async fn test_empty_title_is_not_written() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch_title()
            .times(1)
            .returning(|_| Ok(String::new()));

        let mut links = MockLinkRepository::new();
        links.expect_update_title().times(0);

        process_job(job(), &links, &fetcher).await;
    }

    #[tokio::test]
    async fn test_worker_drains_queue() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch_title()
            .times(2)
            .returning(|_| Ok("Title".to_string()));

        let mut links = MockLinkRepository::new();
        links
            .expect_update_title()
            .times(2)
            .returning(|_, _| Ok(()));

        let (dispatcher, rx) = MetadataDispatcher::channel(4);
        assert!(dispatcher.dispatch(job()));
        assert!(dispatcher.dispatch(MetadataJob {
            url_id: 6,
            long_url: "https://rust-lang.org".to_string(),
        }));
        drop(dispatcher);

        run_metadata_worker(rx, Arc::new(links), Arc::new(fetcher), 2).await;
    }

    #[test]
    fn test_dispatch_drops_when_full() {
        let (dispatcher, _rx) = MetadataDispatcher::channel(1);

        assert!(dispatcher.dispatch(job()));
        assert!(!dispatcher.dispatch(job()));
    }
}
