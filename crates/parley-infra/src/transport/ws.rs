//! WebSocket client transport.
//!
//! [`WsTransport::discover`] connects to a server and waits for its `welcome`
//! frame. After that a writer task drains an outbound queue into the socket
//! and a reader task forwards `delivery` frames into the inbox.
//!
//! Deliveries are filtered against the set of topics this client currently
//! subscribes to. Unsubscribing removes the topic before the frame is sent,
//! so frames the server had already queued for the old topic are dropped.
//!
//! Server `error` frames are queued separately; a front-end collects them
//! with [`WsTransport::take_errors`] and shows them next to its own output.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parley_core::transport::{ChatTransport, SendRequest};
use parley_types::error::TransportError;
use parley_types::frame::{ClientFrame, ServerFrame};
use parley_types::identity::Identity;
use parley_types::message::Delivery;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Pause between connection attempts while discovering.
const RETRY_DELAY: Duration = Duration::from_millis(200);

/// How long `close` waits for queued frames to be flushed.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// What the server announced on connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub url: String,
    pub topic_base: String,
    pub channels: Vec<String>,
    pub admin: Identity,
}

type Topics = Arc<Mutex<HashSet<String>>>;

pub struct WsTransport {
    info: ServerInfo,
    outbound: mpsc::UnboundedSender<ClientFrame>,
    topics: Topics,
    cancel: CancellationToken,
    writer: Mutex<Option<JoinHandle<()>>>,
    errors: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
}

impl WsTransport {
    /// Connect to `url` and wait for the server's welcome.
    ///
    /// Connection attempts are retried until `timeout` elapses, so a client
    /// started right after the server still finds it.
    pub async fn discover(
        url: &str,
        timeout: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Delivery>), TransportError> {
        let attempt = async {
            loop {
                match connect_once(url).await {
                    Ok(connected) => return connected,
                    Err(err) => {
                        debug!(%url, error = %err, "server not reachable yet");
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
            }
        };

        let (stream, info) = tokio::time::timeout(timeout, attempt)
            .await
            .map_err(|_| TransportError::Discovery {
                url: url.to_string(),
                timeout,
            })?;
        info!(%url, topic_base = %info.topic_base, "connected to chat server");

        let (sink, reader) = stream.split();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        let topics: Topics = Arc::default();
        let cancel = CancellationToken::new();

        let writer = tokio::spawn(write_loop(sink, outbound_rx, cancel.clone()));
        tokio::spawn(read_loop(
            reader,
            inbox_tx,
            errors_tx,
            topics.clone(),
            cancel.clone(),
        ));

        let transport = Self {
            info: ServerInfo {
                url: url.to_string(),
                ..info
            },
            outbound: outbound_tx,
            topics,
            cancel,
            writer: Mutex::new(Some(writer)),
            errors: Mutex::new(Some(errors_rx)),
        };
        Ok((transport, inbox_rx))
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Ask the server process to terminate.
    pub fn request_shutdown(&self) -> Result<(), TransportError> {
        self.push(ClientFrame::Shutdown)
    }

    /// Error reports the server sent back for earlier `send` frames.
    ///
    /// Only the first call gets the live queue; later calls get a receiver
    /// that is already closed.
    pub fn take_errors(&self) -> mpsc::UnboundedReceiver<String> {
        let taken = self
            .errors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        taken.unwrap_or_else(|| mpsc::unbounded_channel().1)
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn push(&self, frame: ClientFrame) -> Result<(), TransportError> {
        if self.cancel.is_cancelled() {
            return Err(TransportError::Closed);
        }
        self.outbound.send(frame).map_err(|_| TransportError::Closed)
    }

    fn topics(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.topics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ChatTransport for WsTransport {
    async fn send(&self, request: SendRequest) -> Result<(), TransportError> {
        self.push(ClientFrame::Send {
            sender: request.sender,
            recipients: request.recipients,
            body: request.body,
            authored_by_bot: request.authored_by_bot,
        })
    }

    async fn subscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.push(ClientFrame::Subscribe {
            topic: topic.to_string(),
        })?;
        self.topics().insert(topic.to_string());
        Ok(())
    }

    async fn unsubscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.topics().remove(topic);
        self.push(ClientFrame::Unsubscribe {
            topic: topic.to_string(),
        })
    }

    /// Stop both tasks, flushing frames queued before the call.
    async fn close(&self) -> Result<(), TransportError> {
        self.cancel.cancel();
        let writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(writer) = writer
            && tokio::time::timeout(CLOSE_GRACE, writer).await.is_err()
        {
            debug!("websocket writer did not finish in time");
        }
        Ok(())
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsTransport")
            .field("info", &self.info)
            .field("closed", &self.is_closed())
            .finish()
    }
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// One connection attempt: connect, then read until the welcome frame.
async fn connect_once(url: &str) -> Result<(WsStream, ServerInfo), TransportError> {
    let (mut stream, _response) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| TransportError::Connect(e.to_string()))?;

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ServerFrame>(&text) {
                Ok(ServerFrame::Welcome {
                    topic_base,
                    channels,
                    admin,
                }) => {
                    return Ok((
                        stream,
                        ServerInfo {
                            url: url.to_string(),
                            topic_base,
                            channels,
                            admin,
                        },
                    ));
                }
                Ok(other) => debug!(?other, "frame before welcome ignored"),
                Err(err) => debug!(error = %err, "unparsable frame before welcome"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => return Err(TransportError::Connect(e.to_string())),
        }
    }
    Err(TransportError::Connect(
        "connection closed before welcome".to_string(),
    ))
}

async fn write_loop(
    mut sink: futures_util::stream::SplitSink<WsStream, Message>,
    mut outbound: mpsc::UnboundedReceiver<ClientFrame>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                let text = match serde_json::to_string(&frame) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %TransportError::Encode(e.to_string()), "dropping frame");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    warn!(error = %e, "websocket write failed");
                    break;
                }
            }
        }
    }

    // Drain anything queued before close (e.g. a shutdown request).
    while let Ok(frame) = outbound.try_recv() {
        if let Ok(text) = serde_json::to_string(&frame) {
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    }
    let _ = sink.send(Message::Close(None)).await;
    cancel.cancel();
    debug!("websocket writer stopped");
}

async fn read_loop(
    mut reader: futures_util::stream::SplitStream<WsStream>,
    inbox: mpsc::UnboundedSender<Delivery>,
    errors: mpsc::UnboundedSender<String>,
    topics: Topics,
    cancel: CancellationToken,
) {
    loop {
        let msg = tokio::select! {
            _ = cancel.cancelled() => break,
            msg = reader.next() => msg,
        };

        match msg {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ServerFrame>(&text) {
                Ok(ServerFrame::Delivery { topic, message }) => {
                    let subscribed = topics
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .contains(&topic);
                    if !subscribed {
                        debug!(%topic, "dropping delivery for unsubscribed topic");
                        continue;
                    }
                    if inbox.send(Delivery { topic, message }).is_err() {
                        break;
                    }
                }
                Ok(ServerFrame::Error { message }) => {
                    debug!(%message, "server reported an error");
                    let _ = errors.send(message);
                }
                Ok(ServerFrame::Pong) => debug!("pong"),
                Ok(ServerFrame::Welcome { .. }) => debug!("duplicate welcome ignored"),
                Err(err) => debug!(error = %err, "unparsable frame ignored"),
            },
            Some(Ok(Message::Close(_))) | None => {
                info!("server closed the connection");
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!(error = %e, "websocket read failed");
                break;
            }
        }
    }
    cancel.cancel();
}
