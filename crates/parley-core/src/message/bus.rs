//! In-process pub/sub topic bus.
//!
//! The `TopicBus` is the fan-out hub on the server. Each topic is a
//! `broadcast` channel created on first use. `Subscriptions` owns the
//! forwarding tasks that copy a topic's traffic into one client's inbox, so
//! a client can join and leave topics without touching the bus itself.
//! A topic is dropped from the bus once its last receiver is gone.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parley_types::error::TransportError;
use parley_types::message::{ChatMessage, Delivery};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::transport::Publisher;

/// Buffer size for per-topic broadcast channels.
const TOPIC_BUFFER: usize = 1024;

/// Topic-addressed broadcast hub.
///
/// Cloning the bus clones the handle; all clones share the same topics.
#[derive(Clone, Default)]
pub struct TopicBus {
    topics: Arc<DashMap<String, broadcast::Sender<Delivery>>>,
}

impl TopicBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a topic, creating it if it does not exist.
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<Delivery> {
        let entry = self
            .topics
            .entry(topic.to_string())
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(TOPIC_BUFFER);
                tx
            });
        entry.subscribe()
    }

    /// Publish a message on a topic.
    ///
    /// Returns the number of subscribers that received it. A topic that does
    /// not exist or has no subscribers is not an error.
    pub fn send(&self, topic: &str, message: &ChatMessage) -> usize {
        let delivery = Delivery {
            topic: topic.to_string(),
            message: message.clone(),
        };
        let sent = match self.topics.get(topic) {
            Some(sender) => sender.send(delivery).ok(),
            None => {
                debug!(%topic, "topic has no subscribers, message dropped");
                return 0;
            }
        };

        match sent {
            Some(count) => {
                debug!(%topic, count, "published message to topic");
                count
            }
            None => {
                debug!(%topic, "no active subscribers on topic");
                self.prune(topic);
                0
            }
        }
    }

    /// Remove `topic` if nobody is receiving on it any more.
    pub fn prune(&self, topic: &str) -> bool {
        let removed = self
            .topics
            .remove_if(topic, |_, sender| sender.receiver_count() == 0)
            .is_some();
        if removed {
            debug!(%topic, "topic pruned");
        }
        removed
    }

    /// Number of topics with at least one receiver (or not yet pruned).
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }
}

impl Publisher for TopicBus {
    async fn publish(&self, topic: &str, message: &ChatMessage) -> Result<usize, TransportError> {
        Ok(self.send(topic, message))
    }
}

impl std::fmt::Debug for TopicBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicBus")
            .field("topics", &self.topics.len())
            .finish()
    }
}

/// One client's active topic subscriptions.
///
/// Every subscribed topic has a forwarding task copying deliveries into the
/// client's inbox. Unsubscribing aborts the task, so nothing published on
/// that topic afterwards reaches the inbox. Dropping the set aborts all tasks.
pub struct Subscriptions {
    bus: TopicBus,
    inbox: mpsc::UnboundedSender<Delivery>,
    forwarders: HashMap<String, JoinHandle<()>>,
}

impl Subscriptions {
    pub fn new(bus: TopicBus, inbox: mpsc::UnboundedSender<Delivery>) -> Self {
        Self {
            bus,
            inbox,
            forwarders: HashMap::new(),
        }
    }

    /// Start forwarding `topic`. Re-subscribing an active topic is a no-op.
    pub fn subscribe(&mut self, topic: &str) {
        if self.forwarders.contains_key(topic) {
            return;
        }

        let mut rx = self.bus.subscribe(topic);
        let inbox = self.inbox.clone();
        let name = topic.to_string();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(delivery) => {
                        if inbox.send(delivery).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(topic = %name, skipped, "subscriber lagged, skipping messages");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        self.forwarders.insert(topic.to_string(), handle);
        debug!(%topic, "subscribed");
    }

    /// Stop forwarding `topic`. Returns `true` if it was subscribed.
    pub fn unsubscribe(&mut self, topic: &str) -> bool {
        match self.forwarders.remove(topic) {
            Some(handle) => {
                reap(&self.bus, topic.to_string(), handle);
                debug!(%topic, "unsubscribed");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.forwarders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forwarders.is_empty()
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        for (topic, handle) in self.forwarders.drain() {
            reap(&self.bus, topic, handle);
        }
    }
}

/// Abort a forwarder and prune its topic once the receiver is really gone.
///
/// The receiver lives inside the task, so the prune has to wait for the
/// cancelled task to finish. Outside a runtime the task is only aborted.
fn reap(bus: &TopicBus, topic: String, handle: JoinHandle<()>) {
    handle.abort();
    if let Ok(runtime) = tokio::runtime::Handle::try_current() {
        let bus = bus.clone();
        runtime.spawn(async move {
            let _ = handle.await;
            bus.prune(&topic);
        });
    }
}

impl std::fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriptions")
            .field("topics", &self.forwarders.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
