//! Client error types and their user-facing sentences.

use relay_core::ErrorBody;
use thiserror::Error;

pub const ACCESS_UNAVAILABLE_MESSAGE: &str =
    "Access to the assistant is unavailable at the moment.";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "The assistant could not answer this message. Please try again later.";
pub const BUSY_MESSAGE: &str = "Please wait for the current reply before sending another message.";
pub const EMPTY_MESSAGE: &str = "Type a message before sending.";

/// Why a turn failed.
#[derive(Debug, Error)]
pub enum ClientError {
    /// 401 or 403 from the relay. Not retried.
    #[error("access denied ({status}): {}", .body.describe())]
    AccessDenied { status: u16, body: ErrorBody },

    /// Any other non-transient failure status. Not retried.
    #[error("request rejected ({status}): {}", .body.describe())]
    Rejected { status: u16, body: ErrorBody },

    /// 2xx without a string `reply` field.
    #[error("response carried no reply")]
    MissingReply,

    /// Transient failures on every attempt. `last` is the final error's message.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },

    #[error("a message is already being sent")]
    Busy,

    #[error("message is empty")]
    EmptyMessage,

    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// The sentence to show in the chat transcript.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::AccessDenied { .. } => ACCESS_UNAVAILABLE_MESSAGE.to_string(),
            ClientError::Rejected { .. } | ClientError::MissingReply | ClientError::Http(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            ClientError::Exhausted { last, .. } => format!(
                "Sorry, the assistant is overloaded right now ({last}). Please try again in a few minutes."
            ),
            ClientError::Busy => BUSY_MESSAGE.to_string(),
            ClientError::EmptyMessage => EMPTY_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_embeds_last_error() {
        let e = ClientError::Exhausted {
            attempts: 3,
            last: "maintenance window".into(),
        };
        assert!(e.user_message().contains("maintenance window"));
    }

    #[test]
    fn terminal_errors_use_fixed_sentences() {
        let denied = ClientError::AccessDenied {
            status: 403,
            body: ErrorBody::new("forbidden"),
        };
        assert_eq!(denied.user_message(), ACCESS_UNAVAILABLE_MESSAGE);

        let rejected = ClientError::Rejected {
            status: 502,
            body: ErrorBody::new("upstream_bad_gateway").with_message("raw upstream text"),
        };
        assert_eq!(rejected.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(ClientError::MissingReply.user_message(), GENERIC_FAILURE_MESSAGE);
    }
}
