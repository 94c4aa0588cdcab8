//! `parley exit`: ask a running server to terminate.

use std::time::Duration;

use console::style;
use parley_core::transport::ChatTransport;

use super::connect::discover;

pub async fn exit_server(url: &str, timeout: Duration, quiet: bool) -> anyhow::Result<()> {
    let (transport, _inbox) = discover(url, timeout, quiet).await?;
    transport.request_shutdown()?;
    // Closing flushes the queued shutdown frame.
    transport.close().await?;

    if !quiet {
        println!(
            "  {} Shutdown requested at {}",
            style("*").cyan().bold(),
            style(url).dim()
        );
    }
    Ok(())
}
