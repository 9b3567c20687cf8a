//! Relay client with bounded retry.
//!
//! Each turn is attempted up to `max_attempts` times. 429, 5xx other than
//! 502, and transport failures are retried after `base_delay * attempt`.
//! Everything else ends the turn immediately. A body that is not JSON is
//! reported as a `non_json` error, even with a 2xx status.

use relay_core::{ErrorBody, Message, RelayRequest, is_json_content_type};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Error code for a relay answer that is not JSON.
pub const NON_JSON: &str = "non_json";

/// Result of one HTTP exchange with the relay.
#[derive(Debug)]
enum Attempt {
    Reply(String),
    MissingReply,
    Failed { status: StatusCode, body: ErrorBody },
}

/// HTTP client for the relay endpoint.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
    config: ClientConfig,
}

impl RelayClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends `history` as-is and returns the assistant reply.
    ///
    /// The caller is responsible for bounding the history.
    pub async fn request_reply(&self, history: &[Message]) -> Result<String, ClientError> {
        let payload = RelayRequest {
            history: history.to_vec(),
        };
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let last_error = match self.attempt(&payload).await {
                Ok(Attempt::Reply(reply)) => return Ok(reply),
                Ok(Attempt::MissingReply) => return Err(ClientError::MissingReply),
                Ok(Attempt::Failed { status, body }) => {
                    if !is_transient(status) {
                        debug!(status = status.as_u16(), code = %body.error, "terminal relay failure");
                        return Err(terminal_error(status, body));
                    }
                    body.describe().to_string()
                }
                Err(e) => format!("relay request failed: {e}"),
            };

            if attempt >= max_attempts {
                return Err(ClientError::Exhausted {
                    attempts: attempt,
                    last: last_error,
                });
            }

            // Linear backoff before retry
            let backoff = self.config.base_delay * attempt;
            warn!(attempt, ?backoff, "transient relay failure: {last_error}");
            sleep(backoff).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, payload: &RelayRequest) -> Result<Attempt, reqwest::Error> {
        let resp = self
            .http
            .post(&self.config.endpoint)
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_json_content_type);
        let text = resp.text().await?;

        // A body that is not JSON is a failure whatever the status.
        let parsed = is_json
            .then(|| serde_json::from_str::<serde_json::Value>(&text).ok())
            .flatten();
        let Some(body) = parsed else {
            return Ok(Attempt::Failed {
                status,
                body: non_json(text),
            });
        };

        if status.is_success() {
            return Ok(match body.get("reply").and_then(serde_json::Value::as_str) {
                Some(reply) => Attempt::Reply(reply.to_string()),
                None => Attempt::MissingReply,
            });
        }

        Ok(Attempt::Failed {
            status,
            body: to_error_body(body),
        })
    }
}

/// 429 and 5xx are worth another try, except 502: the relay only answers
/// 502 for an upstream protocol violation, which a retry will not fix.
pub fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status.is_server_error() && status != StatusCode::BAD_GATEWAY)
}

fn terminal_error(status: StatusCode, body: ErrorBody) -> ClientError {
    let status = status.as_u16();
    match status {
        401 | 403 => ClientError::AccessDenied { status, body },
        _ => ClientError::Rejected { status, body },
    }
}

fn non_json(text: String) -> ErrorBody {
    ErrorBody::new(NON_JSON).with_message(text)
}

fn to_error_body(body: serde_json::Value) -> ErrorBody {
    serde_json::from_value(body.clone())
        .unwrap_or_else(|_| ErrorBody::new("unknown_error").with_detalhes(body.to_string()))
}
