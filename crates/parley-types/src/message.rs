//! Chat message domain types for Parley.
//!
//! Defines the `ChatMessage` envelope fanned out by the server, the
//! `RecipientRef` addressing type, and the `Delivery` pairing a message with
//! the topic it arrived on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

use crate::identity::{Identity, USER_PREFIX};

/// A message addressed to one or more channels or users.
///
/// Immutable once built: the router fans out clones of the same envelope to
/// every recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// UUIDv7 message ID.
    pub id: Uuid,
    /// Who claims to have sent the message.
    pub sender: Identity,
    /// Recipients in the order supplied (blanks already dropped).
    pub recipients: Vec<RecipientRef>,
    /// Text body.
    pub body: String,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
    /// Set on every reply produced by an automated responder or a server-side
    /// effect. Loop guards key off this instead of the body text.
    #[serde(default)]
    pub authored_by_bot: bool,
}

/// Where a message is going.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecipientRef {
    /// A named, many-subscriber channel (`general`, `llm`, `robot`).
    Channel { name: String },
    /// A single user handle (`@alice`).
    User { handle: String },
}

impl RecipientRef {
    /// Classify a single trimmed, non-empty token.
    pub fn from_token(token: &str) -> Self {
        if token.starts_with(USER_PREFIX) {
            RecipientRef::User {
                handle: token.to_string(),
            }
        } else {
            RecipientRef::Channel {
                name: token.to_string(),
            }
        }
    }

    pub fn channel(name: impl Into<String>) -> Self {
        RecipientRef::Channel { name: name.into() }
    }

    /// The name used for topic derivation and display.
    pub fn name(&self) -> &str {
        match self {
            RecipientRef::Channel { name } => name,
            RecipientRef::User { handle } => handle,
        }
    }

    pub fn is_channel(&self) -> bool {
        matches!(self, RecipientRef::Channel { .. })
    }
}

impl fmt::Display for RecipientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A message as observed by a subscriber of `topic`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub topic: String,
    pub message: ChatMessage,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(recipients: Vec<RecipientRef>) -> ChatMessage {
        ChatMessage {
            id: Uuid::now_v7(),
            sender: Identity::from("@alice"),
            recipients,
            body: "hello".to_string(),
            timestamp: Utc::now(),
            authored_by_bot: false,
        }
    }

    #[test]
    fn test_recipient_from_token() {
        assert_eq!(
            RecipientRef::from_token("general"),
            RecipientRef::Channel {
                name: "general".to_string()
            }
        );
        assert_eq!(
            RecipientRef::from_token("@bob"),
            RecipientRef::User {
                handle: "@bob".to_string()
            }
        );
        assert!(RecipientRef::from_token("robot").is_channel());
        assert!(!RecipientRef::from_token("@@bot").is_channel());
    }

    #[test]
    fn test_recipient_name_keeps_prefix() {
        assert_eq!(RecipientRef::from_token("@bob").name(), "@bob");
        assert_eq!(RecipientRef::channel("llm").to_string(), "llm");
    }

    #[test]
    fn test_chat_message_json_shape() {
        let msg = sample(vec![RecipientRef::channel("general")]);
        let json_str = serde_json::to_string(&msg).unwrap();

        assert!(json_str.contains("\"sender\":\"@alice\""));
        assert!(json_str.contains("\"type\":\"channel\""));
        assert!(json_str.contains("\"authored_by_bot\":false"));

        let parsed: ChatMessage = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_authored_by_bot_defaults_to_false() {
        let msg = sample(vec![]);
        let mut value = serde_json::to_value(&msg).unwrap();
        value.as_object_mut().unwrap().remove("authored_by_bot");

        let parsed: ChatMessage = serde_json::from_value(value).unwrap();
        assert!(!parsed.authored_by_bot);
    }
}
