//! Server discovery shared by the client commands.

use std::time::Duration;

use anyhow::Context;
use parley_infra::transport::WsTransport;
use parley_types::message::Delivery;
use tokio::sync::mpsc::UnboundedReceiver;

/// Connect to the server at `url`, showing a spinner while waiting.
///
/// Fails when no server answers within `timeout`; the caller exits non-zero.
pub async fn discover(
    url: &str,
    timeout: Duration,
    quiet: bool,
) -> anyhow::Result<(WsTransport, UnboundedReceiver<Delivery>)> {
    let spinner = if quiet {
        indicatif::ProgressBar::hidden()
    } else {
        let spinner = indicatif::ProgressBar::new_spinner();
        if let Ok(style) = indicatif::ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    };
    spinner.set_message(format!("looking for a server at {url}..."));

    let result = WsTransport::discover(url, timeout).await;
    spinner.finish_and_clear();

    result.with_context(|| format!("could not reach a chat server at {url}"))
}
