//! # relay_core
//!
//! Core domain types for the chat relay: messages, bounded conversation
//! history, and the JSON envelopes exchanged between client, relay and
//! upstream.

pub mod conversation;
pub mod models;
pub mod reply;

use thiserror::Error;

pub use conversation::{DEFAULT_HISTORY_LIMIT, History, validate_history};
pub use models::chat::{Message, Role};
pub use models::envelope::{ErrorBody, RelayRequest, ReplyBody, is_json_content_type};

/// Errors raised by domain validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("history is empty")]
    EmptyHistory,
}

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
