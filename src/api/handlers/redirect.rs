//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, Request, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::net::SocketAddr;

use crate::application::services::Visitor;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Look up the code in the cache
/// 2. On a hit, fetch the link id from the database for click logging
/// 3. On a miss, load the active link from the database and repopulate the cache
/// 4. Queue the click for the background worker and bump the cached counter
/// 5. Return `302 Found`
///
/// Click recording never delays or fails the redirect.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown or disabled.
/// Returns 500 Internal Server Error if the database lookup fails on a cache miss.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    req: Request,
) -> Result<impl IntoResponse, AppError> {
    let visitor = {
        let headers = req.headers();
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let header_str = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Visitor {
            ip: client_ip(headers, peer, state.behind_proxy),
            user_agent: header_str(header::USER_AGENT),
            referer: header_str(header::REFERER),
        }
    };

    let resolution = state.redirect_service.redirect(&code, visitor).await?;

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, resolution.long_url)],
    ))
}
