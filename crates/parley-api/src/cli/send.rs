//! `parley send`: one fire-and-forget message.

use std::time::Duration;

use parley_core::transport::{ChatTransport, SendRequest};
use parley_types::identity::Identity;

use super::connect::discover;

pub async fn send_once(
    url: &str,
    timeout: Duration,
    identity: Identity,
    recipients: &str,
    body: &str,
    quiet: bool,
) -> anyhow::Result<()> {
    let (transport, _inbox) = discover(url, timeout, quiet).await?;
    tracing::debug!(%identity, %recipients, "sending one message");

    transport
        .send(SendRequest::new(identity, recipients, body))
        .await?;
    transport.close().await?;
    Ok(())
}
