//! In-process client transport.
//!
//! Talks straight to a `MessageRouter` over its `TopicBus`, with the same
//! semantics the WebSocket transport gives a remote client.

use std::sync::{Arc, Mutex};

use parley_types::error::TransportError;
use parley_types::message::Delivery;
use tokio::sync::mpsc;

use crate::message::bus::{Subscriptions, TopicBus};
use crate::message::router::MessageRouter;
use crate::transport::{ChatTransport, SendRequest};

pub struct LocalTransport {
    router: Arc<MessageRouter<TopicBus>>,
    /// `None` once closed.
    subscriptions: Mutex<Option<Subscriptions>>,
}

impl LocalTransport {
    /// Connect to `router`, returning the transport and its delivery inbox.
    pub fn connect(router: Arc<MessageRouter<TopicBus>>) -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscriptions = Subscriptions::new(router.publisher().clone(), tx);
        let transport = Self {
            router,
            subscriptions: Mutex::new(Some(subscriptions)),
        };
        (transport, rx)
    }

    fn with_subscriptions<R>(
        &self,
        f: impl FnOnce(&mut Subscriptions) -> R,
    ) -> Result<R, TransportError> {
        let mut guard = self
            .subscriptions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.as_mut().map(f).ok_or(TransportError::Closed)
    }

    fn is_closed(&self) -> bool {
        self.with_subscriptions(|_| ()).is_err()
    }
}

impl ChatTransport for LocalTransport {
    async fn send(&self, request: SendRequest) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.router
            .submit(request)
            .await
            .map(|_| ())
            .map_err(|err| TransportError::Send(err.to_string()))
    }

    async fn subscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.with_subscriptions(|subs| subs.subscribe(topic))
    }

    async fn unsubscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.with_subscriptions(|subs| {
            subs.unsubscribe(topic);
        })
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut guard = self
            .subscriptions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Dropping the set aborts every forwarder.
        guard.take();
        Ok(())
    }
}

impl std::fmt::Debug for LocalTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTransport")
            .field("router", &self.router)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::AdminCell;
    use crate::client::repl::{ReplOutcome, ReplSession};
    use crate::client::responder::BotResponder;
    use crate::effect::EffectRegistry;
    use crate::effect::disabled::{DisabledEffect, LLM_DISABLED_TEXT};
    use crate::message::guard::REPLY_SENTINEL;
    use parley_types::identity::Identity;
    use std::time::Duration;

    fn router() -> Arc<MessageRouter<TopicBus>> {
        let effects = EffectRegistry::new().with("llm", DisabledEffect::llm());
        Arc::new(MessageRouter::new(
            TopicBus::new(),
            "parley/chat",
            Arc::new(AdminCell::new(Identity::from("@admin"))),
            effects,
        ))
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Delivery>) -> Option<Delivery> {
        tokio::time::timeout(Duration::from_millis(200), rx.recv())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn send_reaches_subscriber() {
        let router = router();
        let (alice, _alice_rx) = LocalTransport::connect(router.clone());
        let (bob, mut bob_rx) = LocalTransport::connect(router);

        bob.subscribe("parley/chat/general").await.unwrap();
        alice
            .send(SendRequest::new("@alice".into(), "general", "hi bob"))
            .await
            .unwrap();

        let got = next(&mut bob_rx).await.unwrap();
        assert_eq!(got.topic, "parley/chat/general");
        assert_eq!(got.message.body, "hi bob");
        assert_eq!(got.message.sender.as_str(), "@alice");
    }

    #[tokio::test]
    async fn old_channel_is_silent_after_change() {
        let router = router();
        let (repl_transport, mut rx) = LocalTransport::connect(router.clone());
        let (other, _other_rx) = LocalTransport::connect(router);

        let mut repl = ReplSession::new(
            repl_transport,
            Identity::from("@alice"),
            "parley/chat",
            "general",
            Vec::new(),
        );
        repl.start().await.unwrap();
        assert!(matches!(
            repl.handle_line("/c robot").await.unwrap(),
            ReplOutcome::ChannelChanged { .. }
        ));

        other
            .send(SendRequest::new("@bob".into(), "general", "old news"))
            .await
            .unwrap();
        other
            .send(SendRequest::new("@bob".into(), "robot", "new news"))
            .await
            .unwrap();

        let got = next(&mut rx).await.unwrap();
        assert_eq!(got.message.body, "new news");
        assert!(next(&mut rx).await.is_none());
    }

    #[tokio::test]
    async fn direct_messages_survive_hop_through_own_handle() {
        let router = router();
        let (repl_transport, mut rx) = LocalTransport::connect(router.clone());
        let (bob, _bob_rx) = LocalTransport::connect(router);

        let mut repl = ReplSession::new(
            repl_transport,
            Identity::from("@alice"),
            "parley/chat",
            "general",
            Vec::new(),
        );
        repl.start().await.unwrap();
        repl.handle_line("/c @alice").await.unwrap();
        repl.handle_line("/c general").await.unwrap();

        bob.send(SendRequest::new("@bob".into(), "@alice", "psst"))
            .await
            .unwrap();

        let got = next(&mut rx).await.unwrap();
        assert_eq!(got.topic, "parley/chat/@alice");
        assert_eq!(got.message.body, "psst");
    }

    #[tokio::test]
    async fn llm_channel_gets_notice_after_original() {
        let router = router();
        let (client, mut rx) = LocalTransport::connect(router);

        client.subscribe("parley/chat/llm").await.unwrap();
        client
            .send(SendRequest::new("@alice".into(), "llm", "hello model"))
            .await
            .unwrap();

        assert_eq!(next(&mut rx).await.unwrap().message.body, "hello model");
        let notice = next(&mut rx).await.unwrap();
        assert_eq!(notice.message.body, LLM_DISABLED_TEXT);
        assert_eq!(notice.message.sender.as_str(), "@@llm");
    }

    #[tokio::test]
    async fn bot_answers_once_through_the_router() {
        let router = router();
        let (bot_transport, mut bot_rx) = LocalTransport::connect(router.clone());
        let (human, mut human_rx) = LocalTransport::connect(router);

        let bot = BotResponder::new(
            bot_transport,
            Identity::from("@@bot"),
            "parley/chat",
            "general",
            "Hello, I am @@bot!",
        );
        bot.start().await.unwrap();
        human.subscribe("parley/chat/general").await.unwrap();

        human
            .send(SendRequest::new("@alice".into(), "general", "hi @@bot"))
            .await
            .unwrap();

        // The bot sees the human message, replies, then sees its own reply.
        let mention = next(&mut bot_rx).await.unwrap();
        assert!(bot.on_delivery(&mention).await.unwrap());
        let echo = next(&mut bot_rx).await.unwrap();
        assert!(echo.message.authored_by_bot);
        assert!(!bot.on_delivery(&echo).await.unwrap());

        assert_eq!(next(&mut human_rx).await.unwrap().message.body, "hi @@bot");
        let reply = next(&mut human_rx).await.unwrap();
        assert_eq!(reply.message.body, format!("Hello, I am @@bot! {REPLY_SENTINEL}"));
    }

    #[tokio::test]
    async fn closed_transport_rejects_calls() {
        let (client, _rx) = LocalTransport::connect(router());
        client.close().await.unwrap();

        assert!(matches!(
            client.subscribe("parley/chat/general").await,
            Err(TransportError::Closed)
        ));
        assert!(matches!(
            client
                .send(SendRequest::new("@alice".into(), "general", "hi"))
                .await,
            Err(TransportError::Closed)
        ));
    }
}
