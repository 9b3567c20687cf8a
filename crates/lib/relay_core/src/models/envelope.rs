//! Request and response envelopes.
//!
//! The relay accepts a [`RelayRequest`] and always answers with either a
//! [`ReplyBody`] (success) or an [`ErrorBody`] carrying a diagnostic code.

use serde::{Deserialize, Serialize};

use super::chat::Message;

/// Inbound body for both the relay and the backend.
///
/// Older widgets also sent a top-level `message` field alongside `history`.
/// Unknown fields are ignored, so such bodies still parse, but only
/// `history` is ever forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub history: Vec<Message>,
}

/// Successful reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyBody {
    pub reply: String,
}

/// Error envelope. `error` is a stable machine-readable code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detalhes: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_detalhes(mut self, detalhes: impl Into<String>) -> Self {
        self.detalhes = Some(detalhes.into());
        self
    }

    /// Best human-readable description: `message`, then `detalhes`, then the code.
    pub fn describe(&self) -> &str {
        self.message
            .as_deref()
            .or(self.detalhes.as_deref())
            .unwrap_or(&self.error)
    }
}

/// True for `application/json` and `application/*+json`, ignoring parameters
/// and case.
pub fn is_json_content_type(value: &str) -> bool {
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}
