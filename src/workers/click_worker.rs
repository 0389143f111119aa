//! Fire-and-forget click recording.

use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;

/// Submits click events to the background click worker.
///
/// Submission never blocks: if the queue is full or the worker has stopped,
/// the event is dropped with a warning. Ordering between clicks is not
/// guaranteed once events are processed concurrently.
#[derive(Clone)]
pub struct ClickRecorder {
    sender: mpsc::Sender<ClickEvent>,
}

impl ClickRecorder {
    /// Creates a recorder and the receiving end for [`run_click_worker`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ClickEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Queues a click for durable logging.
    ///
    /// Returns `false` if the event was dropped.
    pub fn record_async(&self, event: ClickEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(url_id = event.url_id, "Click queue full, dropping click");
                metrics::counter!("clicks_dropped_total", "reason" => "queue_full").increment(1);
                false
            }
            Err(TrySendError::Closed(event)) => {
                warn!(url_id = event.url_id, "Click worker stopped, dropping click");
                metrics::counter!("clicks_dropped_total", "reason" => "closed").increment(1);
                false
            }
        }
    }
}

/// Persists queued click events until every [`ClickRecorder`] is dropped.
///
/// Failed inserts are logged and the event is discarded; there is no retry.
pub async fn run_click_worker(
    rx: mpsc::Receiver<ClickEvent>,
    clicks: Arc<dyn ClickRepository>,
    concurrency: usize,
) {
    super::run_bounded(rx, concurrency, "click", move |event: ClickEvent| {
        let clicks = clicks.clone();
        async move {
            let url_id = event.url_id;
            match clicks.record_click(event.into()).await {
                Ok(click) => debug!(url_id, click_id = click.id, "Click recorded"),
                Err(e) => warn!(url_id, error = %e, "Failed to record click"),
            }
        }
    })
    .await;
}
