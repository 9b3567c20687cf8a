//! Request handlers.

pub mod backend;
pub mod health;
pub mod relay;

use axum::http::Method;

use crate::error::AppError;

/// Fallback for POST-only routes. Runs before any body is read.
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method.to_string())
}
