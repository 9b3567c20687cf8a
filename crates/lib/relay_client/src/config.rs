//! Client configuration.

use std::time::Duration;

use relay_core::DEFAULT_HISTORY_LIMIT;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly, direct and informative assistant \
for an NGO that supports low-income communities. Never use styling such as bold text or emojis.";

/// Settings for [`RelayClient`](crate::RelayClient) and
/// [`ChatSession`](crate::ChatSession).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the relay endpoint (e.g. `https://example.org/api/chat`).
    pub endpoint: String,
    /// Total attempts per turn, first try included.
    pub max_attempts: u32,
    /// Wait before retry `n` is `base_delay * n`.
    pub base_delay: Duration,
    /// Deadline for a single attempt.
    pub request_timeout: Duration,
    /// Non-system messages sent with each turn.
    pub history_limit: usize,
    pub system_prompt: String,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            history_limit: DEFAULT_HISTORY_LIMIT,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::new("http://localhost:3000/api/chat");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay, Duration::from_secs(1));
        assert_eq!(config.history_limit, 20);
        assert!(!config.system_prompt.is_empty());
    }
}
