//! Detached background workers.
//!
//! Request handlers never await background work: they submit jobs to bounded
//! queues and return. Each worker drains its queue with bounded concurrency;
//! job failures are logged and dropped. When every sender is gone the worker
//! finishes queued and in-flight jobs and returns, which is what lets the
//! server drain on shutdown.
//!
//! - [`click_worker`] - Durable click logging
//! - [`metadata_worker`] - Page title fetching for new links

pub mod click_worker;
pub mod metadata_worker;

use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Runs `handler` for every job received on `rx`, at most `concurrency` at a time.
///
/// Returns once the channel is closed and all spawned jobs have completed.
pub(crate) async fn run_bounded<T, F, Fut>(
    mut rx: mpsc::Receiver<T>,
    concurrency: usize,
    worker: &'static str,
    handler: F,
) where
    T: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let concurrency = concurrency.max(1);
    let mut tasks = JoinSet::new();

    while let Some(job) = rx.recv().await {
        while let Some(result) = tasks.try_join_next() {
            log_join_error(worker, result);
        }

        while tasks.len() >= concurrency {
            if let Some(result) = tasks.join_next().await {
                log_join_error(worker, result);
            }
        }

        tasks.spawn(handler(job));
    }

    while let Some(result) = tasks.join_next().await {
        log_join_error(worker, result);
    }

    info!(worker, "Worker drained and stopped");
}

fn log_join_error(worker: &'static str, result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(worker, error = %e, "Background job panicked");
    }
}
