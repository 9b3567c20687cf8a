//! # relay_api
//!
//! HTTP layer for the chat relay: the relay handler that forwards browser
//! requests to a fixed upstream, and the chat backend that upstream runs.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{BackendConfig, RelayConfig};
use crate::handlers::{backend, health, relay};

/// Path the browser widget posts to.
pub const RELAY_PATH: &str = "/api/chat";
/// Path the backend serves completions on.
pub const CHAT_PATH: &str = "/chat";
pub const HEALTH_PATH: &str = "/api/health";

/// Shared state for the relay router.
#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    /// Pooled client; every request through it is bounded by the configured timeout.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let http = http_client(config.upstream_timeout)?;
        Ok(Self { config, http })
    }
}

/// Shared state for the backend router.
#[derive(Clone)]
pub struct BackendState {
    pub config: BackendConfig,
    pub http: reqwest::Client,
}

impl BackendState {
    pub fn new(config: BackendConfig) -> Result<Self, reqwest::Error> {
        let http = http_client(config.completion_timeout)?;
        Ok(Self { config, http })
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Builds the relay router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            RELAY_PATH,
            post(relay::relay_handler).fallback(handlers::method_not_allowed),
        )
        .route(HEALTH_PATH, get(health::health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the backend router. A POST to the chat route checks origin first,
/// then the caller's access key.
pub fn backend_router(state: BackendState) -> Router {
    let origins = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect::<Vec<_>>();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    // Auth wraps the POST endpoint only; other methods get 405 unauthenticated.
    let chat = post(backend::chat_handler)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_access_key,
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_allowed_origin,
        ))
        .fallback(handlers::method_not_allowed);

    Router::new()
        .route(HEALTH_PATH, get(health::health_handler))
        .route(CHAT_PATH, chat)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
