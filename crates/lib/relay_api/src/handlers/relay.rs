//! Relay handler: forwards the widget's chat history to the fixed upstream
//! with the server-held credential attached.
//!
//! Single endpoint `POST /api/chat` that:
//! 1. Parses the inbound `{ history }` body
//! 2. Forwards it to the configured upstream with `Authorization: Bearer`
//! 3. Inspects status and content-type before reading the body
//! 4. Normalizes the upstream answer into `{ reply }` or an error envelope

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relay_core::{RelayRequest, is_json_content_type};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error, info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};

/// `POST /api/chat`: relay a chat turn upstream.
pub async fn relay_handler(State(state): State<AppState>, body: Bytes) -> AppResult<Response> {
    let request: RelayRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid chat request: {e}")))?;

    let credential = state.config.upstream_credential.as_ref();
    debug!(
        messages = request.history.len(),
        credential_present = credential.is_some(),
        upstream = %state.config.upstream_url,
        "forwarding chat request"
    );

    let mut req_builder = state
        .http
        .post(state.config.upstream_url.as_str())
        .json(&request);
    match credential {
        Some(credential) => req_builder = req_builder.bearer_auth(credential.expose()),
        None => warn!("no upstream credential configured, forwarding without Authorization"),
    }

    let upstream_response = req_builder.send().await.map_err(upstream_failure)?;

    // Status and content-type are decided before the body is consumed.
    let status = upstream_response.status();
    let is_json = upstream_response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(is_json_content_type);

    info!(status = status.as_u16(), json = is_json, "upstream responded");

    let bytes = upstream_response.bytes().await.map_err(upstream_failure)?;

    if !status.is_success() {
        if is_json {
            let body: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
                error!("upstream error body is not valid JSON: {e}");
                AppError::Internal(format!("Upstream error body parse failed: {e}"))
            })?;
            return Err(AppError::UpstreamStructured {
                status,
                body: normalize_structured_error(body),
            });
        }
        let text = String::from_utf8_lossy(&bytes).into_owned();
        warn!(status = status.as_u16(), "upstream returned a non-JSON error");
        return Err(AppError::UpstreamText { status, text });
    }

    if !is_json {
        warn!(
            status = status.as_u16(),
            "upstream returned success without a JSON body"
        );
        return Err(AppError::BadGateway);
    }

    let payload: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
        error!("upstream success body is not valid JSON: {e}");
        AppError::Internal(format!("Upstream body parse failed: {e}"))
    })?;

    Ok((StatusCode::OK, Json(payload)).into_response())
}

/// Upstream JSON errors that already carry an `error` code are relayed as-is.
/// Anything else is wrapped so the body still has a diagnostic code.
fn normalize_structured_error(body: serde_json::Value) -> serde_json::Value {
    if body.get("error").is_some_and(serde_json::Value::is_string) {
        return body;
    }
    serde_json::json!({
        "error": "upstream_error",
        "message": "Upstream returned an error",
        "detalhes": body.to_string(),
    })
}

fn upstream_failure(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        warn!("upstream request timed out");
        return AppError::UpstreamTimeout;
    }
    error!("upstream request failed: {e}");
    AppError::Internal(format!("Upstream request failed: {e}"))
}
