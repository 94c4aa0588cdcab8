//! WebSocket endpoint for chat clients.
//!
//! The `/ws` endpoint upgrades an HTTP connection to a WebSocket. Once
//! connected, the handler:
//!
//! - **Greets:** sends a `welcome` frame with the topic base, the advertised
//!   channels, and the current admin. Clients treat it as discovery.
//! - **Forwards deliveries:** every `subscribe` starts a forwarder from the
//!   topic bus into this connection's inbox; `unsubscribe` stops it.
//! - **Routes sends:** `send` frames go through the message router. A
//!   delivery failure is reported back as an `error` frame and the connection
//!   stays open.
//!
//! Dropping the connection drops its subscriptions.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use parley_core::message::bus::Subscriptions;
use parley_core::transport::SendRequest;
use parley_types::frame::{ClientFrame, ServerFrame};
use parley_types::message::Delivery;
use tokio::sync::mpsc;

use crate::state::AppState;

/// Upgrade an HTTP request to a chat connection.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

/// Per-connection task.
///
/// Uses `tokio::select!` over server shutdown, this connection's delivery
/// inbox, and inbound client frames, so one task owns both halves of the
/// socket.
async fn handle_connection(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (inbox_tx, mut inbox_rx) = mpsc::unbounded_channel::<Delivery>();
    let mut subscriptions = Subscriptions::new(state.bus.clone(), inbox_tx);

    let welcome = ServerFrame::Welcome {
        topic_base: state.router.topic_base().to_string(),
        channels: state.channels.to_vec(),
        admin: state.router.admin().get(),
    };
    if send_frame(&mut ws_sender, &welcome).await.is_err() {
        return;
    }
    tracing::debug!("chat client connected");

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => {
                let _ = ws_sender.send(Message::Close(None)).await;
                break;
            }

            delivery = inbox_rx.recv() => {
                let Some(Delivery { topic, message }) = delivery else { break };
                let frame = ServerFrame::Delivery { topic, message };
                if send_frame(&mut ws_sender, &frame).await.is_err() {
                    break;
                }
            }

            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = process_frame(&text, &mut subscriptions, &state).await
                            && send_frame(&mut ws_sender, &reply).await.is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!("WebSocket receive error: {err}");
                        break;
                    }
                    // Ignore binary, ping, pong protocol frames (handled by axum/tungstenite)
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!(topics = subscriptions.len(), "chat client disconnected");
}

/// Apply one client frame. Returns the frame to answer with, if any.
async fn process_frame(
    text: &str,
    subscriptions: &mut Subscriptions,
    state: &AppState,
) -> Option<ServerFrame> {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(err) => {
            tracing::warn!(raw = %text, error = %err, "Ignoring malformed client frame");
            return None;
        }
    };

    match frame {
        ClientFrame::Subscribe { topic } => {
            subscriptions.subscribe(&topic);
            None
        }
        ClientFrame::Unsubscribe { topic } => {
            subscriptions.unsubscribe(&topic);
            None
        }
        ClientFrame::Send {
            sender,
            recipients,
            body,
            authored_by_bot,
        } => {
            let request = SendRequest {
                sender,
                recipients,
                body,
                authored_by_bot,
            };
            match state.router.submit(request).await {
                Ok(_) => None,
                Err(err) => Some(ServerFrame::Error {
                    message: err.to_string(),
                }),
            }
        }
        ClientFrame::Shutdown => {
            tracing::info!("shutdown requested by client");
            state.shutdown.cancel();
            None
        }
        ClientFrame::Ping => Some(ServerFrame::Pong),
    }
}

async fn send_frame(
    ws_sender: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
    frame: &ServerFrame,
) -> Result<(), axum::Error> {
    match serde_json::to_string(frame) {
        Ok(json) => ws_sender.send(Message::Text(json.into())).await,
        Err(err) => {
            tracing::warn!("Failed to serialize server frame: {err}");
            Ok(())
        }
    }
}
