//! Cleanup of raw completion text before it is returned as a reply.

/// Marker some reasoning models emit between their analysis and the answer.
pub const FINAL_ANSWER_MARKER: &str = "assistantfinal";

/// Returns the user-facing part of a completion.
///
/// Text up to and including the first [`FINAL_ANSWER_MARKER`] is dropped.
/// The result is trimmed either way.
pub fn extract_final_reply(raw: &str) -> &str {
    match raw.split_once(FINAL_ANSWER_MARKER) {
        Some((_, answer)) => answer.trim(),
        None => raw.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_reasoning_preamble() {
        let raw = "analysisThe user greets.assistantfinal  Olá! Como posso ajudar?\n";
        assert_eq!(extract_final_reply(raw), "Olá! Como posso ajudar?");
    }

    #[test]
    fn splits_on_first_marker_only() {
        assert_eq!(
            extract_final_reply("xassistantfinal a assistantfinal b"),
            "a assistantfinal b"
        );
    }

    #[test]
    fn plain_text_is_trimmed() {
        assert_eq!(extract_final_reply("  hello \n"), "hello");
    }
}
