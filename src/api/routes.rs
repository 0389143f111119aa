//! API route configuration.

use crate::api::handlers::{create_url_handler, list_urls_handler};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{Router, middleware, routing::post};

/// Link management routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST /urls`                - Create a short link (rate limited)
/// - `GET  /urls?username={u}`   - List a user's links
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/urls", post(create_url_handler).get(list_urls_handler))
        .route_layer(middleware::from_fn_with_state(state, rate_limit::layer))
}
