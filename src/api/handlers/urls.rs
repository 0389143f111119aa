//! Handlers for link creation and listing.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::urls::{CreateUrlRequest, ListUrlsQuery, UrlResponse};
use crate::application::services::CreateLink;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/urls`
///
/// # Request Body
///
/// ```json
/// {
///   "long_url": "https://example.com/some/long/path",
///   "username": "alice",
///   "custom_code": "promo"
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "id": 42,
///   "short_code": "promo",
///   "long_url": "https://example.com/some/long/path",
///   "short_url": "/promo",
///   "created_at": "2025-01-01T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400` malformed body or failed validation
/// - `409` short code already exists
/// - `429` rate limit exceeded (see [`crate::api::middleware::rate_limit`])
/// - `500` the cache write failed
pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UrlResponse>), AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Invalid request body",
            json!({ "reason": rejection.body_text() }),
        )
    })?;
    payload.validate()?;

    let created = state
        .link_service
        .create_short_link(CreateLink {
            long_url: payload.long_url,
            username: payload.username,
            custom_code: payload.custom_code,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Lists the most recent links of a user, newest first.
///
/// # Endpoint
///
/// `GET /api/urls?username=alice`
///
/// Returns at most 100 links. When the database is unavailable the list is
/// empty rather than an error.
///
/// # Errors
///
/// Returns `400` if `username` is missing or empty.
pub async fn list_urls_handler(
    State(state): State<AppState>,
    Query(query): Query<ListUrlsQuery>,
) -> Result<Json<Vec<UrlResponse>>, AppError> {
    let username = query
        .username
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| {
            AppError::bad_request(
                "Username is required",
                json!({ "field": "username" }),
            )
        })?;

    let links = state.link_service.list_links(&username).await;

    Ok(Json(links.into_iter().map(UrlResponse::from).collect()))
}
