//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::HealthResponse;
use crate::state::AppState;

/// Reports database and cache connectivity.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: database and cache reachable
/// - **503 Service Unavailable**: either one is down
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "database": true,
///   "redis": true,
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (database, redis) = tokio::join!(state.links.health_check(), state.cache.health_check());

    let healthy = database && redis;
    let status = if healthy {
        StatusCode::OK
    } else {
        tracing::warn!(database, redis, "Health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        database,
        redis,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status, Json(response))
}
