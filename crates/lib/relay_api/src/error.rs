//! Application error types.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::ALLOW},
    response::{IntoResponse, Response},
};
use relay_core::ErrorBody;
use thiserror::Error;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Generic text for upstream success responses that are not JSON.
pub const BAD_GATEWAY_MESSAGE: &str = "Upstream returned an invalid response";

/// Generic text for faults inside the relay itself.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal proxy error";

/// Application-level errors with HTTP status mapping.
///
/// Every variant renders as a JSON body carrying an `error` code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Upstream failed with a JSON body; relayed with the upstream status.
    #[error("Upstream error {status}")]
    UpstreamStructured {
        status: StatusCode,
        body: serde_json::Value,
    },

    /// Upstream failed with a non-JSON body; wrapped with the upstream status.
    #[error("Upstream error {status}: {text}")]
    UpstreamText { status: StatusCode, text: String },

    /// Upstream answered 2xx with something other than JSON.
    #[error("Upstream returned a non-JSON success response")]
    BadGateway,

    #[error("Upstream request timed out")]
    UpstreamTimeout,

    #[error("Completion failed: {0}")]
    CompletionFailed(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::MethodNotAllowed(method) => {
                let body = ErrorBody::new("method_not_allowed")
                    .with_message(format!("Method {method} not allowed"));
                let mut resp = (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response();
                resp.headers_mut()
                    .insert(ALLOW, HeaderValue::from_static("POST"));
                return resp;
            }
            AppError::InvalidRequest(m) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("invalid_request").with_message(m),
            ),
            AppError::Unauthorized(m) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("unauthorized").with_message(m),
            ),
            AppError::Forbidden(m) => (
                StatusCode::FORBIDDEN,
                ErrorBody::new("forbidden").with_message(m),
            ),
            AppError::UpstreamStructured { status, body } => {
                return (status, Json(body)).into_response();
            }
            AppError::UpstreamText { status, text } => {
                (status, ErrorBody::new("upstream_text").with_message(text))
            }
            AppError::BadGateway => (
                StatusCode::BAD_GATEWAY,
                ErrorBody::new("upstream_bad_gateway").with_message(BAD_GATEWAY_MESSAGE),
            ),
            AppError::UpstreamTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorBody::new("upstream_timeout").with_message("Upstream did not answer in time"),
            ),
            AppError::CompletionFailed(m) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody::new("completion_failed").with_message(m),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("proxy_internal_error").with_message(INTERNAL_ERROR_MESSAGE),
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl From<relay_core::CoreError> for AppError {
    fn from(e: relay_core::CoreError) -> Self {
        match e {
            relay_core::CoreError::EmptyHistory => {
                AppError::InvalidRequest("Message history is missing or empty".into())
            }
        }
    }
}
