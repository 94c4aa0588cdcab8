//! `parley run`: the chat server.

use anyhow::Context;
use console::style;
use parley_types::config::ServerConfig;

use crate::http::router::build_router;
use crate::signal::shutdown_signal;
use crate::state::AppState;

pub async fn run_server(config: ServerConfig, quiet: bool) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let state = AppState::new(&config);
    let shutdown = state.shutdown.clone();

    // Signals and `parley exit` both end up cancelling the same token.
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    tracing::info!(
        %addr,
        topic_base = %config.topic_base,
        llm_enabled = config.llm_enabled,
        "chat server starting"
    );
    if !quiet {
        println!(
            "  {} Parley server listening on {}",
            style("*").cyan().bold(),
            style(format!("ws://{addr}/ws")).cyan()
        );
        println!(
            "  {}  {}",
            style("Channels:").bold(),
            style(config.channels.join(", ")).dim()
        );
        println!(
            "  {}       {}",
            style("LLM:").bold(),
            style(if config.llm_enabled { "enabled" } else { "disabled" }).dim()
        );
        println!("  {}", style("Press Ctrl+C to stop").dim());
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}
