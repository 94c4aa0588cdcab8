//! Loop guard preventing automated responders from replying to each other forever.
//!
//! Two signals mark a message as bot-authored:
//! - the structured `authored_by_bot` flag on the envelope
//! - the reply sentinel appended to the body (kept for clients that only see text)
//!
//! The sentinel is a heuristic. A human who ends a message with the exact
//! sentinel text is indistinguishable from a bot and will not get a reply.

use parley_types::identity::Identity;
use parley_types::message::ChatMessage;

/// Token appended to every bot-authored reply body.
pub const REPLY_SENTINEL: &str = "[bot]";

/// Whether a bot named `own_identity` should answer `body`.
///
/// True only when the body mentions the identity and does not carry the reply
/// sentinel. Pure: no history is consulted.
pub fn should_respond(body: &str, own_identity: &str) -> bool {
    !own_identity.is_empty() && body.contains(own_identity) && !body.contains(REPLY_SENTINEL)
}

/// Append the reply sentinel to a body.
pub fn mark_reply(body: &str) -> String {
    let body = body.trim_end();
    if body.is_empty() {
        REPLY_SENTINEL.to_string()
    } else {
        format!("{body} {REPLY_SENTINEL}")
    }
}

/// Per-responder guard bound to one identity.
#[derive(Debug, Clone)]
pub struct LoopGuard {
    identity: Identity,
}

impl LoopGuard {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Check an inbound envelope. Bot-authored envelopes are never answered.
    pub fn accepts(&self, message: &ChatMessage) -> bool {
        !message.authored_by_bot && should_respond(&message.body, self.identity.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::envelope;
    use parley_types::message::RecipientRef;

    #[test]
    fn responds_to_mention_without_sentinel() {
        assert!(should_respond("hey @@bot, you there?", "@@bot"));
    }

    #[test]
    fn ignores_messages_without_mention() {
        assert!(!should_respond("hello everyone", "@@bot"));
    }

    #[test]
    fn sentinel_suppresses_regardless_of_mention() {
        assert!(!should_respond("@@bot hi [bot]", "@@bot"));
        assert!(!should_respond("[bot] no mention", "@@bot"));
    }

    #[test]
    fn human_text_ending_in_sentinel_is_suppressed() {
        // Known limitation of the text marker.
        assert!(!should_respond("@@bot what does [bot] mean", "@@bot"));
    }

    #[test]
    fn empty_identity_never_matches() {
        assert!(!should_respond("anything", ""));
    }

    #[test]
    fn mark_reply_appends_sentinel_once() {
        assert_eq!(mark_reply("Hello, I am @@bot!  "), "Hello, I am @@bot! [bot]");
        assert_eq!(mark_reply(""), "[bot]");
        assert!(!should_respond(&mark_reply("Hello, I am @@bot!"), "@@bot"));
    }

    #[test]
    fn guard_rejects_flagged_envelopes_even_without_sentinel() {
        let guard = LoopGuard::new(Identity::from("@@bot"));
        let general = vec![RecipientRef::channel("general")];

        let human = envelope::chat(Identity::from("@alice"), general.clone(), "hi @@bot");
        assert!(guard.accepts(&human));

        let mut flagged = human.clone();
        flagged.authored_by_bot = true;
        assert!(!guard.accepts(&flagged));

        let reply = envelope::bot_reply(Identity::from("@@other"), general, "hi @@bot");
        assert!(!guard.accepts(&reply));
    }

    #[test]
    fn two_bots_do_not_ping_pong() {
        let a = LoopGuard::new(Identity::from("@@a"));
        let b = LoopGuard::new(Identity::from("@@b"));
        let general = vec![RecipientRef::channel("general")];

        let opener = envelope::chat(Identity::from("@human"), general.clone(), "@@a meet @@b");
        assert!(a.accepts(&opener));

        // a's reply mentions b, but b must not answer it.
        let reply = envelope::bot_reply(Identity::from("@@a"), general, "hi @@b");
        assert!(!b.accepts(&reply));
        assert!(!a.accepts(&reply));
    }
}
