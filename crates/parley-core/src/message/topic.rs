//! Outbound topic naming: `<topic_base>/<recipient-name>`.

use parley_types::message::RecipientRef;

/// Topic a recipient's messages are published on.
pub fn outbound_topic(topic_base: &str, recipient: &RecipientRef) -> String {
    channel_topic(topic_base, recipient.name())
}

/// Topic for a bare channel or handle name.
pub fn channel_topic(topic_base: &str, name: &str) -> String {
    format!("{}/{}", topic_base.trim_end_matches('/'), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_name() {
        assert_eq!(
            outbound_topic("parley/chat", &RecipientRef::channel("general")),
            "parley/chat/general"
        );
        assert_eq!(
            outbound_topic("parley/chat", &RecipientRef::from_token("@bob")),
            "parley/chat/@bob"
        );
    }

    #[test]
    fn tolerates_trailing_slash_in_base() {
        assert_eq!(channel_topic("parley/chat/", "llm"), "parley/chat/llm");
    }
}
