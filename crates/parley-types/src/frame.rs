//! Wire frames exchanged between clients and the server over a WebSocket.
//!
//! Every frame is a JSON text message tagged by `type`. Unknown or malformed
//! frames are ignored by both ends.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::message::ChatMessage;

/// Frames a client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Start receiving deliveries for `topic`.
    Subscribe { topic: String },
    /// Stop receiving deliveries for `topic`.
    Unsubscribe { topic: String },
    /// Route a message. `recipients` is the raw comma-separated string.
    Send {
        sender: Identity,
        recipients: String,
        body: String,
        #[serde(default)]
        authored_by_bot: bool,
    },
    /// Ask the server process to terminate.
    Shutdown,
    /// Keep-alive. Server answers with `pong`.
    Ping,
}

/// Frames the server sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// First frame on every connection.
    Welcome {
        topic_base: String,
        channels: Vec<String>,
        admin: Identity,
    },
    /// A message published on a topic the client subscribed to.
    Delivery { topic: String, message: ChatMessage },
    /// The previous request failed.
    Error { message: String },
    Pong,
}
