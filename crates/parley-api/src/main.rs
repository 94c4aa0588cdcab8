//! Parley CLI entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads `config.toml`, applies flag overrides, then
//! dispatches to the server, REPL, bot, or one-shot commands.

mod cli;
mod http;
mod signal;
mod state;

use std::time::Duration;

use clap::Parser;
use clap_complete::generate;
use parley_infra::config::load_config;
use parley_infra::filesystem::resolve_data_dir;
use parley_observe::tracing_setup::{filter_for_verbosity, init_tracing, shutdown_tracing};
use parley_types::identity::Identity;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(filter_for_verbosity(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need config
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    let result = dispatch(cli).await;
    shutdown_tracing();
    result
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let data_dir = resolve_data_dir();
    let mut config = load_config(&data_dir).await;

    if let Some(server) = cli.server {
        config.client.server_url = server;
    }
    let url = config.client.server_url.clone();
    let timeout = Duration::from_secs(config.client.discovery_timeout_secs);

    match cli.command {
        Commands::Run { llm, port, host } => {
            let mut server = config.server;
            server.llm_enabled |= llm;
            if let Some(port) = port {
                server.port = port;
            }
            if let Some(host) = host {
                server.host = host;
            }
            cli::run::run_server(server, cli.quiet).await?;
        }

        Commands::Exit => {
            cli::exit::exit_server(&url, timeout, cli.quiet).await?;
        }

        Commands::Repl { identity, channel } => {
            let identity = Identity::new(identity.unwrap_or(config.client.identity));
            let channel = channel.unwrap_or(config.client.default_channel);
            cli::repl::loop_runner::run_repl(&url, timeout, identity, channel, cli.quiet).await?;
        }

        Commands::Send {
            recipients,
            message,
            identity,
        } => {
            let identity = Identity::new(identity.unwrap_or(config.client.identity));
            let body = message.join(" ");
            cli::send::send_once(&url, timeout, identity, &recipients, &body, cli.quiet).await?;
        }

        Commands::Bot { identity, channel } => {
            let mut bot = config.bot;
            if let Some(identity) = identity {
                bot.identity = identity;
            }
            if let Some(channel) = channel {
                bot.channel = channel;
            }
            let reply = bot.render_reply();
            cli::bot::run_bot(
                &url,
                timeout,
                Identity::new(bot.identity),
                bot.channel,
                reply,
                cli.quiet,
            )
            .await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
