//! Message router: admin override, per-recipient fan-out, and channel effects.
//!
//! For every routed message the router:
//! 1. Consumes `/admin <name>` bodies by updating the admin cell (no fan-out).
//! 2. Publishes the message on each recipient's topic, in recipient order.
//! 3. Runs the recipient's channel effect, if any, and publishes its reply on
//!    the same topic after the original.
//!
//! Recipients are independent. A failed publish or a failing, hanging, or
//! panicking effect on one recipient never stops the others.

use std::sync::Arc;
use std::time::Duration;

use parley_types::error::{EffectError, RouteError};
use parley_types::identity::Identity;
use parley_types::message::{ChatMessage, RecipientRef};
use tracing::{debug, info, warn};

use crate::admin::{AdminCell, parse_admin_directive};
use crate::effect::{BoxChannelEffect, EffectRegistry};
use crate::recipient;
use crate::transport::{Publisher, SendRequest};

use super::envelope;
use super::topic::outbound_topic;

/// Default upper bound on one effect invocation.
const DEFAULT_EFFECT_TIMEOUT: Duration = Duration::from_secs(30);

/// What a `route` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The body was an admin directive and was consumed.
    AdminChanged { admin: Identity },
    /// The message was fanned out.
    Delivered {
        /// Recipients the original message was published to.
        published: usize,
        /// Effect replies published.
        replies: usize,
    },
    /// Nothing to do (blank body).
    Ignored,
}

/// Server-side router fanning messages out through a [`Publisher`].
pub struct MessageRouter<P> {
    publisher: P,
    topic_base: String,
    admin: Arc<AdminCell>,
    effects: EffectRegistry,
    effect_timeout: Duration,
}

impl<P: Publisher> MessageRouter<P> {
    pub fn new(
        publisher: P,
        topic_base: impl Into<String>,
        admin: Arc<AdminCell>,
        effects: EffectRegistry,
    ) -> Self {
        Self {
            publisher,
            topic_base: topic_base.into(),
            admin,
            effects,
            effect_timeout: DEFAULT_EFFECT_TIMEOUT,
        }
    }

    pub fn with_effect_timeout(mut self, timeout: Duration) -> Self {
        self.effect_timeout = timeout;
        self
    }

    pub fn topic_base(&self) -> &str {
        &self.topic_base
    }

    pub fn admin(&self) -> &AdminCell {
        &self.admin
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Resolve a raw recipient string and route a human-authored message.
    pub async fn route(
        &self,
        sender: &Identity,
        raw_recipients: &str,
        body: &str,
    ) -> Result<RouteOutcome, RouteError> {
        let recipients = recipient::resolve(Some(raw_recipients));
        self.dispatch(envelope::chat(sender.clone(), recipients, body))
            .await
    }

    /// Route a client send request, carrying its bot-authorship flag onto the envelope.
    pub async fn submit(&self, request: SendRequest) -> Result<RouteOutcome, RouteError> {
        let recipients = recipient::resolve(Some(&request.recipients));
        let mut message = envelope::chat(request.sender, recipients, request.body);
        message.authored_by_bot = request.authored_by_bot;
        self.dispatch(message).await
    }

    /// Route an already-built envelope.
    pub async fn dispatch(&self, message: ChatMessage) -> Result<RouteOutcome, RouteError> {
        let body = message.body.trim();

        if let Some(name) = parse_admin_directive(body) {
            let admin = Identity::new(name);
            let previous = self.admin.set(admin.clone());
            info!(sender = %message.sender, %previous, %admin, "admin identity changed");
            return Ok(RouteOutcome::AdminChanged { admin });
        }

        if body.is_empty() {
            debug!(sender = %message.sender, "ignoring blank message");
            return Ok(RouteOutcome::Ignored);
        }

        // Normalise before fan-out starts; the envelope is not touched afterwards.
        let message = if body.len() == message.body.len() {
            message
        } else {
            ChatMessage {
                body: body.to_string(),
                ..message
            }
        };

        debug!(
            sender = %message.sender,
            recipients = message.recipients.len(),
            "routing message"
        );

        let mut published = 0;
        let mut replies = 0;
        let mut failed = Vec::new();

        for recipient in &message.recipients {
            let topic = outbound_topic(&self.topic_base, recipient);

            if let Err(err) = self.publisher.publish(&topic, &message).await {
                warn!(%topic, error = %err, "publish failed");
                failed.push(recipient.name().to_string());
                continue;
            }
            published += 1;

            let Some(effect) = self.effect_for(recipient) else {
                continue;
            };
            let Some(text) = self.run_effect(effect, &message, recipient).await else {
                continue;
            };

            let reply = envelope::effect_reply(recipient, text);
            match self.publisher.publish(&topic, &reply).await {
                Ok(_) => replies += 1,
                Err(err) => {
                    warn!(%topic, error = %err, "publish of effect reply failed");
                    failed.push(recipient.name().to_string());
                }
            }
        }

        if failed.is_empty() {
            Ok(RouteOutcome::Delivered { published, replies })
        } else {
            Err(RouteError::Delivery { failed, published })
        }
    }

    fn effect_for(&self, recipient: &RecipientRef) -> Option<&BoxChannelEffect> {
        if recipient.is_channel() {
            self.effects.lookup(recipient.name())
        } else {
            None
        }
    }

    /// Run one effect on its own task, bounded by the effect timeout.
    ///
    /// Returns the reply text, or `None` when there is nothing to publish.
    async fn run_effect(
        &self,
        effect: &BoxChannelEffect,
        message: &ChatMessage,
        recipient: &RecipientRef,
    ) -> Option<String> {
        let channel = recipient.name().to_string();
        let effect = effect.clone();
        let sender = message.sender.clone();
        let body = message.body.clone();
        let task_channel = channel.clone();

        let mut task =
            tokio::spawn(async move { effect.invoke(&sender, &task_channel, &body).await });

        let result = match tokio::time::timeout(self.effect_timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                warn!(%channel, error = %join_err, "channel effect panicked");
                return None;
            }
            Err(_) => {
                task.abort();
                Err(EffectError::TimedOut(self.effect_timeout))
            }
        };

        match result {
            Ok(Some(text)) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(err) => {
                warn!(%channel, error = %err, "channel effect failed");
                None
            }
        }
    }
}

impl<P> std::fmt::Debug for MessageRouter<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRouter")
            .field("topic_base", &self.topic_base)
            .field("effects", &self.effects)
            .field("effect_timeout", &self.effect_timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
