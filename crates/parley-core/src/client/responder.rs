//! Bot responder: a standing subscriber that answers mentions of its identity.
//!
//! The loop guard is the only protection against runaway reply chains. There
//! is no retry and no rate limiting.

use parley_types::error::TransportError;
use parley_types::identity::Identity;
use parley_types::message::Delivery;
use tracing::debug;

use crate::message::guard::{LoopGuard, mark_reply};
use crate::message::topic::channel_topic;
use crate::transport::{ChatTransport, SendRequest};

pub struct BotResponder<T> {
    transport: T,
    guard: LoopGuard,
    topic_base: String,
    channel: String,
    reply: String,
}

impl<T: ChatTransport> BotResponder<T> {
    /// `reply` is the unmarked reply text; the sentinel is appended on send.
    pub fn new(
        transport: T,
        identity: Identity,
        topic_base: impl Into<String>,
        channel: impl Into<String>,
        reply: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            guard: LoopGuard::new(identity),
            topic_base: topic_base.into(),
            channel: channel.into(),
            reply: reply.into(),
        }
    }

    pub fn identity(&self) -> &Identity {
        self.guard.identity()
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn topic(&self) -> String {
        channel_topic(&self.topic_base, &self.channel)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn start(&self) -> Result<(), TransportError> {
        self.transport.subscribe(&self.topic()).await
    }

    /// Handle one inbound delivery. Returns `true` if a reply was sent.
    pub async fn on_delivery(&self, delivery: &Delivery) -> Result<bool, TransportError> {
        if delivery.topic != self.topic() {
            return Ok(false);
        }
        if !self.guard.accepts(&delivery.message) {
            return Ok(false);
        }

        debug!(
            bot = %self.identity(),
            from = %delivery.message.sender,
            "mention received, replying"
        );
        let request = SendRequest::new(
            self.identity().clone(),
            self.channel.clone(),
            mark_reply(&self.reply),
        )
        .from_bot();
        self.transport.send(request).await?;
        Ok(true)
    }
}

impl<T> std::fmt::Debug for BotResponder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotResponder")
            .field("guard", &self.guard)
            .field("channel", &self.channel)
            .finish()
    }
}
