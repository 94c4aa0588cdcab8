use serde::{Deserialize, Serialize};

use std::fmt;

/// Prefix marking an automated agent (`@@name`).
pub const BOT_PREFIX: &str = "@@";

/// Prefix marking a human user (`@name`) or a user recipient.
pub const USER_PREFIX: &str = "@";

/// An opaque participant name.
///
/// The system trusts whatever the sender claims; two identities are the same
/// participant when their strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

/// Naming convention an identity follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    /// `@name`
    User,
    /// `@@name`
    Bot,
    /// Anything else (e.g. the server itself).
    Other,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Identity used for side-effect replies authored by the server on `channel`.
    pub fn server_effect(channel: &str) -> Self {
        Self(format!("{BOT_PREFIX}{channel}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> IdentityKind {
        if self.0.starts_with(BOT_PREFIX) {
            IdentityKind::Bot
        } else if self.0.starts_with(USER_PREFIX) {
            IdentityKind::User
        } else {
            IdentityKind::Other
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_kind_by_prefix() {
        assert_eq!(Identity::from("@@bot").kind(), IdentityKind::Bot);
        assert_eq!(Identity::from("@alice").kind(), IdentityKind::User);
        assert_eq!(Identity::from("server").kind(), IdentityKind::Other);
    }

    #[test]
    fn test_server_effect_identity() {
        assert_eq!(Identity::server_effect("llm").as_str(), "@@llm");
    }

    #[test]
    fn test_identity_serializes_as_plain_string() {
        let json = serde_json::to_string(&Identity::from("@carol")).unwrap();
        assert_eq!(json, "\"@carol\"");
    }
}
