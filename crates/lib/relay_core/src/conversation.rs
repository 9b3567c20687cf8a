//! Bounded, append-only conversation history.

use crate::CoreError;
use crate::models::chat::Message;

/// Number of non-system messages sent with each request.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Conversation history anchored by a system message.
///
/// The system message is always the first entry and is never evicted.
/// Everything after it is append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    system: Message,
    turns: Vec<Message>,
}

impl History {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system: Message::system(system_prompt),
            turns: Vec::new(),
        }
    }

    /// Appends a user or assistant message. System messages after the
    /// first are stored as ordinary turns so ordering is preserved.
    pub fn push(&mut self, message: Message) {
        self.turns.push(message);
    }

    /// Total number of messages, system message included.
    pub fn len(&self) -> usize {
        self.turns.len() + 1
    }

    /// Always false: the system message is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn system(&self) -> &Message {
        &self.system
    }

    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    /// The system message followed by the `limit` most recent turns.
    pub fn window(&self, limit: usize) -> Vec<Message> {
        let start = self.turns.len().saturating_sub(limit);
        let mut out = Vec::with_capacity(self.turns.len() - start + 1);
        out.push(self.system.clone());
        out.extend_from_slice(&self.turns[start..]);
        out
    }
}

/// Checks a history received over the wire.
///
/// Role and content shape are already enforced by deserialization; this
/// rejects empty histories.
pub fn validate_history(history: &[Message]) -> Result<(), CoreError> {
    if history.is_empty() {
        return Err(CoreError::EmptyHistory);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    fn history_with_turns(n: usize) -> History {
        let mut h = History::new("be nice");
        for i in 0..n {
            if i % 2 == 0 {
                h.push(Message::user(format!("q{i}")));
            } else {
                h.push(Message::assistant(format!("a{i}")));
            }
        }
        h
    }

    #[test]
    fn window_keeps_system_plus_most_recent() {
        let h = history_with_turns(25);
        let w = h.window(DEFAULT_HISTORY_LIMIT);

        assert_eq!(w.len(), 21);
        assert_eq!(w[0], Message::system("be nice"));
        assert_eq!(w[1].content, "a5");
        assert_eq!(w[20].content, "q24");
    }

    #[test]
    fn window_shorter_than_limit_keeps_everything() {
        let h = history_with_turns(3);
        let w = h.window(DEFAULT_HISTORY_LIMIT);
        assert_eq!(w.len(), 4);
        assert_eq!(w[0].role, Role::System);
    }

    #[test]
    fn window_of_zero_is_only_system() {
        let h = history_with_turns(5);
        assert_eq!(h.window(0), vec![Message::system("be nice")]);
    }

    #[test]
    fn len_counts_system_message() {
        assert_eq!(History::new("s").len(), 1);
        assert_eq!(history_with_turns(4).len(), 5);
    }

    #[test]
    fn empty_history_is_invalid() {
        assert_eq!(validate_history(&[]), Err(CoreError::EmptyHistory));
        assert!(validate_history(&[Message::user("hi")]).is_ok());
    }
}
