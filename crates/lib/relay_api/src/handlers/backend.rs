//! Chat backend: answers relayed chat turns using an OpenAI-compatible
//! chat completion API.
//!
//! Origin and access-key checks run as route middleware before this handler.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use relay_core::reply::extract_final_reply;
use relay_core::{Message, RelayRequest, ReplyBody, validate_history};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::BackendState;
use crate::error::{AppError, AppResult};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// `POST /chat`: produce the assistant reply for a conversation.
pub async fn chat_handler(
    State(state): State<BackendState>,
    body: Bytes,
) -> AppResult<Json<ReplyBody>> {
    let request: RelayRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid message format: {e}")))?;
    validate_history(&request.history)?;

    let api_key = state.config.completion_api_key.as_ref().ok_or_else(|| {
        error!("no completion API key configured");
        AppError::Internal("Completion API key not configured".into())
    })?;

    debug!(
        messages = request.history.len(),
        model = %state.config.model,
        "requesting completion"
    );

    let resp = state
        .http
        .post(state.config.completion_url.as_str())
        .bearer_auth(api_key.expose())
        .json(&CompletionRequest {
            model: &state.config.model,
            messages: &request.history,
        })
        .send()
        .await
        .map_err(completion_failure)?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        warn!(status = status.as_u16(), "completion API returned an error");
        return Err(AppError::CompletionFailed(format!(
            "Completion API returned {status}: {body}"
        )));
    }

    let data: CompletionResponse = resp.json().await.map_err(completion_failure)?;
    let raw = data
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AppError::CompletionFailed("Completion returned no content".into()))?;

    Ok(Json(ReplyBody {
        reply: extract_final_reply(&raw).to_string(),
    }))
}

fn completion_failure(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        warn!("completion request timed out");
        return AppError::UpstreamTimeout;
    }
    error!("completion request failed: {e}");
    AppError::CompletionFailed(format!("Completion request failed: {e}"))
}
