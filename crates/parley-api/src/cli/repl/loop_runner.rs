//! Main REPL loop.
//!
//! Multiplexes typed lines, deliveries and error reports from the server, and
//! process termination signals. Every way out of the loop takes the same
//! path: stop reading, release the terminal, then close the connection.

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use console::style;
use parley_core::client::repl::{ReplOutcome, ReplSession};
use parley_core::transport::ChatTransport;
use parley_types::identity::Identity;

use super::banner::print_welcome_banner;
use super::commands::{print_channels, print_help, render_delivery};
use super::input::{InputEvent, ReplInput};
use crate::cli::connect::discover;
use crate::signal::shutdown_signal;

/// Run the interactive client until `/exit`, Ctrl+D, Ctrl+C, or SIGTERM.
pub async fn run_repl(
    url: &str,
    timeout: Duration,
    identity: Identity,
    channel: String,
    quiet: bool,
) -> anyhow::Result<()> {
    let (transport, mut inbox) = discover(url, timeout, quiet).await?;
    let info = transport.info().clone();
    let mut server_errors = transport.take_errors();

    let mut session = ReplSession::new(
        transport,
        identity.clone(),
        info.topic_base.clone(),
        channel,
        info.channels.clone(),
    );
    session.start().await.context("failed to join channel")?;

    print_welcome_banner(identity.as_str(), url, session.channel(), info.admin.as_str());

    let (mut input, mut writer) = ReplInput::new(identity.as_str(), session.channel())
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                tracing::info!("termination signal received");
                break;
            }

            delivery = inbox.recv() => {
                let Some(delivery) = delivery else {
                    let _ = writeln!(writer, "\n  {}", style("Server closed the connection.").yellow());
                    break;
                };
                if session.accepts(&delivery) {
                    let _ = writeln!(writer, "{}", render_delivery(&info.topic_base, &delivery));
                }
            }

            Some(message) = server_errors.recv() => {
                let _ = writeln!(writer, "  {} server: {message}", style("!").red().bold());
            }

            event = input.read_line() => {
                let line = match event {
                    InputEvent::Line(line) => line,
                    InputEvent::Eof | InputEvent::Interrupted => break,
                };

                match session.handle_line(&line).await {
                    Ok(ReplOutcome::Exit) => break,
                    Ok(ReplOutcome::ChannelChanged { to, .. }) => {
                        input.set_channel(&to);
                        let _ = writeln!(writer, "  {} now on {}", style("*").cyan().bold(), style(&to).bold());
                    }
                    Ok(ReplOutcome::ShowHelp) => print_help(&mut writer),
                    Ok(ReplOutcome::ShowChannels { current, known }) => {
                        print_channels(&mut writer, &current, &known);
                    }
                    Ok(ReplOutcome::Sent | ReplOutcome::Ignored) => {}
                    Err(err) => {
                        // The REPL keeps accepting input after a failed send.
                        let _ = writeln!(writer, "  {} {err}", style("!").red().bold());
                    }
                }
            }
        }
    }

    // Release the terminal before tearing down the connection.
    input.flush();
    drop(input);
    drop(writer);
    println!("\n  {}", style("Session ended.").dim());

    session.transport().close().await?;
    Ok(())
}
