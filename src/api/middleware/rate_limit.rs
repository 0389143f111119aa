//! Fixed-window rate limiting for link creation.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use std::net::SocketAddr;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Header carrying an explicit client identifier.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Largest creation body buffered to read the client key.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Rejects creation requests once a client exceeds the configured limit.
///
/// Only `POST` requests are counted; other methods pass through.
///
/// # Client Key
///
/// 1. `X-API-Key` header
/// 2. `username` field of the JSON body
/// 3. Client address (see [`client_ip`])
///
/// The body is buffered to read the username and handed on unchanged.
///
/// # Errors
///
/// Returns `429 Too Many Requests` when the client is over the limit and
/// `400 Bad Request` if the body cannot be read.
///
/// # Example
///
/// ```rust,ignore
/// let api = Router::new()
///     .route("/urls", post(create_url_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() != Method::POST {
        return Ok(next.run(req).await);
    }

    let (parts, body) = req.into_parts();
    let body = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        AppError::bad_request(
            "Request body could not be read",
            json!({ "reason": e.to_string() }),
        )
    })?;

    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(&parts.headers, &body, peer, st.behind_proxy);

    if !st.rate_limiter.allow(&key).await {
        return Err(AppError::rate_limited(
            "Rate limit exceeded",
            json!({
                "limit": st.rate_limiter.limit(),
                "window_seconds": st.rate_limiter.window_seconds(),
            }),
        ));
    }

    let req = Request::from_parts(parts, Body::from(body));
    Ok(next.run(req).await)
}

/// Resolves the identifier a request is rate limited under.
pub fn client_key(
    headers: &HeaderMap,
    body: &Bytes,
    peer: Option<SocketAddr>,
    behind_proxy: bool,
) -> String {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(key) = api_key {
        return key.to_string();
    }

    let username = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("username")?.as_str().map(str::to_string))
        .filter(|u| !u.is_empty());
    if let Some(username) = username {
        return username;
    }

    client_ip(headers, peer, behind_proxy).unwrap_or_else(|| "unknown".to_string())
}
