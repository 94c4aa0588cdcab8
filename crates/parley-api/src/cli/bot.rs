//! `parley bot`: a standing auto-responder on one channel.

use std::time::Duration;

use parley_core::client::responder::BotResponder;
use parley_core::transport::ChatTransport;
use parley_types::identity::Identity;

use super::connect::discover;
use crate::signal::shutdown_signal;

pub async fn run_bot(
    url: &str,
    timeout: Duration,
    identity: Identity,
    channel: String,
    reply: String,
    quiet: bool,
) -> anyhow::Result<()> {
    let (transport, mut inbox) = discover(url, timeout, quiet).await?;
    let topic_base = transport.info().topic_base.clone();
    let mut server_errors = transport.take_errors();

    let bot = BotResponder::new(transport, identity, topic_base, channel, reply);
    bot.start().await?;
    println!(
        "BOT: Connected to {url} as {} on {}",
        bot.identity(),
        bot.channel()
    );

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            Some(message) = server_errors.recv() => {
                println!("BOT: Error {message}");
            }
            delivery = inbox.recv() => {
                let Some(delivery) = delivery else {
                    println!("BOT: Server closed the connection");
                    break;
                };
                println!(
                    "BOT: Payload {} -> {}: {}",
                    delivery.message.sender, delivery.topic, delivery.message.body
                );
                match bot.on_delivery(&delivery).await {
                    Ok(true) => tracing::debug!("reply sent"),
                    Ok(false) => {}
                    Err(err) => tracing::warn!(error = %err, "reply failed"),
                }
            }
        }
    }

    bot.transport().close().await?;
    Ok(())
}
