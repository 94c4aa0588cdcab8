//! Transport seams.
//!
//! The router only needs a [`Publisher`]; clients (REPL, bot responders) talk to
//! a server through a [`ChatTransport`]. Both use native async fn in traits
//! and are implemented by the in-process bus here and by the WebSocket
//! transport in `parley-infra`.

use std::future::Future;
use std::sync::Arc;

use parley_types::error::TransportError;
use parley_types::identity::Identity;
use parley_types::message::ChatMessage;

/// Publishes a message on a topic.
pub trait Publisher: Send + Sync {
    /// Publish `message` on `topic`, returning how many subscribers received it.
    fn publish(
        &self,
        topic: &str,
        message: &ChatMessage,
    ) -> impl Future<Output = Result<usize, TransportError>> + Send;
}

/// A client-side request to route a message through the server.
#[derive(Debug, Clone, PartialEq)]
pub struct SendRequest {
    pub sender: Identity,
    /// Raw comma-separated recipients, resolved by the server.
    pub recipients: String,
    pub body: String,
    pub authored_by_bot: bool,
}

impl SendRequest {
    pub fn new(sender: Identity, recipients: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender,
            recipients: recipients.into(),
            body: body.into(),
            authored_by_bot: false,
        }
    }

    /// Mark the request as produced by an automated responder.
    pub fn from_bot(mut self) -> Self {
        self.authored_by_bot = true;
        self
    }
}

/// Client-facing connection to a chat server.
///
/// Deliveries for subscribed topics arrive on an inbox the implementation
/// hands out when it is created.
pub trait ChatTransport: Send + Sync {
    /// Fire-and-forget send through the server's router.
    fn send(&self, request: SendRequest) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn subscribe(&self, topic: &str) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn unsubscribe(&self, topic: &str)
    -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Release the connection. Further calls fail with `TransportError::Closed`.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send {
        async { Ok(()) }
    }
}

impl<T: ChatTransport> ChatTransport for Arc<T> {
    fn send(&self, request: SendRequest) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).send(request)
    }

    fn subscribe(&self, topic: &str) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).subscribe(topic)
    }

    fn unsubscribe(
        &self,
        topic: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).unsubscribe(topic)
    }

    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).close()
    }
}
