//! Backend access middleware: origin allowlist and bearer access key.

use axum::http::header::{AUTHORIZATION, ORIGIN};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::BackendState;
use crate::error::AppError;

/// Rejects requests whose `Origin` is not on the allowlist.
/// Requests without an `Origin` header (server-to-server) pass.
pub async fn require_allowed_origin(
    State(state): State<BackendState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(value) = request.headers().get(ORIGIN) {
        let origin = value.to_str().unwrap_or_default();
        if !state.config.is_origin_allowed(origin) {
            warn!(origin, "origin not allowed");
            return Err(AppError::Forbidden("Origin not allowed".into()));
        }
    }

    Ok(next.run(request).await)
}

/// Axum middleware: requires `Authorization: Bearer <access key>`.
///
/// With no access key configured every request is rejected.
pub async fn require_access_key(
    State(state): State<BackendState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let expected = state.config.access_key.as_ref().ok_or_else(|| {
        warn!("no access key configured, rejecting request");
        AppError::Unauthorized("Access key not configured".into())
    })?;

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing or malformed authorization header".into()))?;

    if !expected.matches(token) {
        warn!("unauthorized access attempt");
        return Err(AppError::Unauthorized("Invalid access key".into()));
    }

    Ok(next.run(request).await)
}
