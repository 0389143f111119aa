//! HTTP server initialization and runtime setup.
//!
//! Handles database and cache connections, worker spawning, and the Axum
//! server lifecycle including graceful shutdown.

use crate::application::services::{LinkService, RateLimiter, RedirectService};
use crate::config::Config;
use crate::domain::repositories::{ClickRepository, LinkRepository, UserRepository};
use crate::infrastructure::cache::{CacheService, RedisCache};
use crate::infrastructure::metadata::HttpMetadataFetcher;
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRepository, PgUserRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::workers::click_worker::{ClickRecorder, run_click_worker};
use crate::workers::metadata_worker::{MetadataDispatcher, run_metadata_worker};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (lazy, so the service starts while the database is down)
/// - Apply migrations (failure is logged)
/// - Redis cache (required)
/// - Background click and metadata workers
/// - Axum HTTP server
///
/// On SIGINT/SIGTERM the server stops accepting connections, finishes
/// in-flight requests, then waits for both workers to drain their queues.
///
/// # Errors
///
/// Returns an error if:
/// - The database URL is malformed
/// - Redis is unreachable
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = create_pool(&config)?;

    match sqlx::migrate!("./migrations").run(&pool).await {
        Ok(()) => tracing::info!("Database migrations applied"),
        Err(e) => tracing::warn!(error = %e, "Failed to apply migrations, continuing in degraded mode"),
    }

    let cache: Arc<dyn CacheService> = Arc::new(
        RedisCache::connect(&config.redis_url)
            .await
            .context("Redis is required for link creation and rate limiting")?,
    );

    let pool = Arc::new(pool);
    let link_repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let user_repository: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
    let click_repository: Arc<dyn ClickRepository> = Arc::new(PgClickRepository::new(pool));

    let fetcher = Arc::new(
        HttpMetadataFetcher::new(Duration::from_secs(config.metadata_fetch_timeout_seconds))
            .context("Failed to build metadata HTTP client")?,
    );

    let (click_recorder, click_rx) = ClickRecorder::channel(config.click_queue_capacity);
    let (metadata_dispatcher, metadata_rx) =
        MetadataDispatcher::channel(config.metadata_queue_capacity);

    let click_worker = tokio::spawn(run_click_worker(
        click_rx,
        click_repository,
        config.worker_concurrency,
    ));
    let metadata_worker = tokio::spawn(run_metadata_worker(
        metadata_rx,
        link_repository.clone(),
        fetcher,
        config.worker_concurrency,
    ));
    tracing::info!(
        concurrency = config.worker_concurrency,
        "Click and metadata workers started"
    );

    let state = AppState {
        link_service: Arc::new(LinkService::new(
            link_repository.clone(),
            user_repository,
            cache.clone(),
            metadata_dispatcher,
            config.cache_ttl_seconds,
        )),
        redirect_service: Arc::new(RedirectService::new(
            link_repository.clone(),
            cache.clone(),
            click_recorder,
            config.cache_ttl_seconds,
        )),
        rate_limiter: Arc::new(RateLimiter::new(
            cache.clone(),
            config.rate_limit_requests,
            config.rate_limit_window_seconds,
        )),
        links: link_repository,
        cache,
        behind_proxy: config.behind_proxy,
    };

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router and every state clone are gone, so the job senders are closed.
    tracing::info!("Server stopped, draining background workers");
    let (clicks, metadata) = tokio::join!(click_worker, metadata_worker);
    if let Err(e) = clicks {
        tracing::error!(error = %e, "Click worker terminated abnormally");
    }
    if let Err(e) = metadata {
        tracing::error!(error = %e, "Metadata worker terminated abnormally");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Builds a lazily connecting pool from the configured limits.
///
/// # Errors
///
/// Returns an error if the database URL cannot be parsed.
pub fn create_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect_lazy(&config.database_url)
        .context("Invalid DATABASE_URL")
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
