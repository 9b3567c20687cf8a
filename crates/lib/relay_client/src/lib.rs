//! # relay_client
//!
//! Client side of the chat relay.
//!
//! - [`RelayClient`]: posts a bounded history to the relay and retries
//!   transient failures (429 and most 5xx) with linear backoff
//! - [`ChatSession`]: owns the conversation history, commits a turn only
//!   when a reply arrives, and refuses overlapping sends
//! - [`ClientError::user_message`]: the sentence to show the user when a
//!   turn fails

pub mod config;
pub mod error;
pub mod retry;
pub mod session;

pub use config::ClientConfig;
pub use error::ClientError;
pub use retry::RelayClient;
pub use session::ChatSession;
