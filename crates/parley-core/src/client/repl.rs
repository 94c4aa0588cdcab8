//! REPL command interpreter.
//!
//! Lines starting with a known command word (`/channel`, `change-channel`,
//! `exit` and friends) drive local state; every other non-blank line is sent
//! as a chat message to the current channel. Unknown
//! slash words (for example `/admin carol`) are sent as chat too, so in-band
//! server directives pass straight through.

use parley_types::error::TransportError;
use parley_types::identity::Identity;
use parley_types::message::Delivery;
use tracing::debug;

use crate::message::topic::channel_topic;
use crate::transport::{ChatTransport, SendRequest};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Switch to another channel. `None` when the name was omitted.
    ChangeChannel(Option<String>),
    /// Leave the REPL.
    Exit,
    /// Show usage text.
    Help,
    /// Show known channels.
    ListChannels,
    /// Anything else: a chat message for the current channel.
    Message(String),
    /// Blank line.
    Blank,
}

impl ReplCommand {
    /// Parse one line, tokenized on whitespace.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Blank;
        }

        let mut tokens = trimmed.split_whitespace();
        let head = tokens.next().unwrap_or_default().to_lowercase();

        match head.as_str() {
            "/channel" | "/c" | "change-channel" => {
                Self::ChangeChannel(tokens.next().map(str::to_string))
            }
            "/exit" | "/quit" | "/q" | "exit" => Self::Exit,
            "/help" | "/h" | "/?" | "help" => Self::Help,
            "/channels" | "/ls" | "list-channels" => Self::ListChannels,
            _ => Self::Message(trimmed.to_string()),
        }
    }
}

/// What the front-end should do after a line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplOutcome {
    /// A chat message was handed to the transport.
    Sent,
    ChannelChanged { from: String, to: String },
    ShowHelp,
    ShowChannels { current: String, known: Vec<String> },
    /// Nothing happened (blank line, missing channel name, same channel).
    Ignored,
    /// Stop reading input and shut down.
    Exit,
}

/// Interactive client state: identity plus the one channel it is joined to.
///
/// Besides the current channel the session listens on its own identity's
/// topic, so direct messages reach it whatever channel is active.
pub struct ReplSession<T> {
    transport: T,
    identity: Identity,
    topic_base: String,
    channel: String,
    known_channels: Vec<String>,
}

impl<T: ChatTransport> ReplSession<T> {
    pub fn new(
        transport: T,
        identity: Identity,
        topic_base: impl Into<String>,
        channel: impl Into<String>,
        known_channels: Vec<String>,
    ) -> Self {
        Self {
            transport,
            identity,
            topic_base: topic_base.into(),
            channel: channel.into(),
            known_channels,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn channel_topic(&self) -> String {
        channel_topic(&self.topic_base, &self.channel)
    }

    fn direct_topic(&self) -> String {
        channel_topic(&self.topic_base, self.identity.as_str())
    }

    /// Join the initial channel and the direct-message topic.
    pub async fn start(&self) -> Result<(), TransportError> {
        self.transport.subscribe(&self.channel_topic()).await?;
        self.transport.subscribe(&self.direct_topic()).await
    }

    /// Whether an inbound delivery belongs to this session's current view.
    pub fn accepts(&self, delivery: &Delivery) -> bool {
        delivery.topic == self.channel_topic() || delivery.topic == self.direct_topic()
    }

    /// Interpret one input line.
    ///
    /// Transport failures are returned to the caller; the session stays usable.
    pub async fn handle_line(&mut self, line: &str) -> Result<ReplOutcome, TransportError> {
        match ReplCommand::parse(line) {
            ReplCommand::Blank => Ok(ReplOutcome::Ignored),
            ReplCommand::Exit => Ok(ReplOutcome::Exit),
            ReplCommand::Help => Ok(ReplOutcome::ShowHelp),
            ReplCommand::ListChannels => Ok(ReplOutcome::ShowChannels {
                current: self.channel.clone(),
                known: self.known_channels.clone(),
            }),
            ReplCommand::ChangeChannel(None) => Ok(ReplOutcome::Ignored),
            ReplCommand::ChangeChannel(Some(name)) => self.change_channel(name).await,
            ReplCommand::Message(body) => {
                let request = SendRequest::new(self.identity.clone(), self.channel.clone(), body);
                self.transport.send(request).await?;
                Ok(ReplOutcome::Sent)
            }
        }
    }

    async fn change_channel(&mut self, name: String) -> Result<ReplOutcome, TransportError> {
        if name == self.channel {
            return Ok(ReplOutcome::Ignored);
        }

        let old_topic = self.channel_topic();
        let new_topic = channel_topic(&self.topic_base, &name);
        // The direct topic stays joined for the whole session, even when it
        // doubles as the current channel.
        let direct_topic = self.direct_topic();

        if old_topic != direct_topic {
            self.transport.unsubscribe(&old_topic).await?;
        }
        if new_topic != direct_topic
            && let Err(err) = self.transport.subscribe(&new_topic).await
        {
            // Best effort: stay on the old channel rather than on none.
            if old_topic != direct_topic
                && let Err(restore) = self.transport.subscribe(&old_topic).await
            {
                debug!(topic = %old_topic, error = %restore, "failed to rejoin previous channel");
            }
            return Err(err);
        }

        let from = std::mem::replace(&mut self.channel, name);
        debug!(%from, to = %self.channel, "channel changed");
        Ok(ReplOutcome::ChannelChanged {
            from,
            to: self.channel.clone(),
        })
    }
}

impl<T> std::fmt::Debug for ReplSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplSession")
            .field("identity", &self.identity)
            .field("channel", &self.channel)
            .finish()
    }
}
