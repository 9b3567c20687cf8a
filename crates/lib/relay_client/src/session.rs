//! Chat session: the conversation state a front end owns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use relay_core::{History, Message};
use tracing::debug;

use crate::error::ClientError;
use crate::retry::RelayClient;

/// One conversation with the relay.
///
/// A turn is committed to the history (user message and reply together)
/// only when a reply arrives. At most one turn is in flight; a concurrent
/// [`send`](Self::send) fails with [`ClientError::Busy`].
#[derive(Debug)]
pub struct ChatSession {
    client: RelayClient,
    history: Mutex<History>,
    in_flight: AtomicBool,
}

impl ChatSession {
    pub fn new(client: RelayClient) -> Self {
        let history = History::new(client.config().system_prompt.clone());
        Self {
            client,
            history: Mutex::new(history),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Snapshot of the committed history.
    pub fn history(&self) -> History {
        self.lock_history().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Sends one user message and returns the assistant reply.
    ///
    /// On error the history is left exactly as it was.
    pub async fn send(&self, text: &str) -> Result<String, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(ClientError::Busy)?;

        let mut draft = self.history();
        draft.push(Message::user(text));
        let window = draft.window(self.client.config().history_limit);
        debug!(window = window.len(), total = draft.len(), "sending turn");

        let reply = self.client.request_reply(&window).await?;

        draft.push(Message::assistant(reply.clone()));
        *self.lock_history() = draft;
        Ok(reply)
    }

    fn lock_history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the in-flight flag; clears it on drop, including when the send
/// future is dropped mid-request.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let guard = InFlightGuard::acquire(&flag).expect("first acquire");
        assert!(InFlightGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }

    #[tokio::test]
    async fn blank_message_is_rejected_without_request() {
        let client = RelayClient::new(crate::ClientConfig::new("http://127.0.0.1:9/api/chat"))
            .expect("client");
        let session = ChatSession::new(client);

        let err = session.send("   ").await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyMessage));
        assert_eq!(session.history().len(), 1);
        assert!(!session.is_in_flight());
    }
}
