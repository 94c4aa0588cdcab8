//! Helper constructors for `ChatMessage` envelopes.
//!
//! Reduces boilerplate when building human messages, bot replies, and
//! server-authored side-effect replies.

use chrono::Utc;
use parley_types::identity::Identity;
use parley_types::message::{ChatMessage, RecipientRef};
use uuid::Uuid;

use super::guard::mark_reply;

/// Build a message as sent by a participant.
pub fn chat(
    sender: Identity,
    recipients: Vec<RecipientRef>,
    body: impl Into<String>,
) -> ChatMessage {
    ChatMessage {
        id: Uuid::now_v7(),
        sender,
        recipients,
        body: body.into(),
        timestamp: Utc::now(),
        authored_by_bot: false,
    }
}

/// Build a reply authored by an automated responder.
///
/// The body carries the reply sentinel and the envelope is flagged as
/// bot-authored, so both text-based and structured loop guards skip it.
pub fn bot_reply(
    sender: Identity,
    recipients: Vec<RecipientRef>,
    body: impl AsRef<str>,
) -> ChatMessage {
    ChatMessage {
        authored_by_bot: true,
        ..chat(sender, recipients, mark_reply(body.as_ref()))
    }
}

/// Build the server-authored follow-up a channel side effect produced.
pub fn effect_reply(channel: &RecipientRef, text: impl Into<String>) -> ChatMessage {
    ChatMessage {
        authored_by_bot: true,
        ..chat(
            Identity::server_effect(channel.name()),
            vec![channel.clone()],
            text,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::guard::REPLY_SENTINEL;

    #[test]
    fn chat_builds_human_envelope() {
        let msg = chat(
            Identity::from("@alice"),
            vec![RecipientRef::channel("general")],
            "hello",
        );
        assert_eq!(msg.sender.as_str(), "@alice");
        assert_eq!(msg.body, "hello");
        assert!(!msg.authored_by_bot);
    }

    #[test]
    fn bot_reply_is_flagged_and_marked() {
        let msg = bot_reply(
            Identity::from("@@bot"),
            vec![RecipientRef::channel("general")],
            "Hello, I am @@bot!",
        );
        assert!(msg.authored_by_bot);
        assert!(msg.body.ends_with(REPLY_SENTINEL));
    }

    #[test]
    fn effect_reply_comes_from_channel_identity() {
        let robot = RecipientRef::channel("robot");
        let msg = effect_reply(&robot, "ok");
        assert_eq!(msg.sender.as_str(), "@@robot");
        assert_eq!(msg.recipients, vec![robot]);
        assert!(msg.authored_by_bot);
    }
}
