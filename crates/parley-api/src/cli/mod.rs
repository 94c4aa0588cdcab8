//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod bot;
pub mod connect;
pub mod exit;
pub mod repl;
pub mod run;
pub mod send;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Multi-channel chat server, REPL, and bots.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Server WebSocket URL (overrides `client.server_url`).
    #[arg(long, global = true, env = "PARLEY_SERVER")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat server.
    Run {
        /// Answer the llm channel with the inference backend.
        #[arg(long)]
        llm: bool,

        /// Port to listen on (overrides `server.port`).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides `server.host`).
        #[arg(long)]
        host: Option<String>,
    },

    /// Ask a running server to terminate.
    Exit,

    /// Start an interactive chat client.
    Repl {
        /// Identity to chat as, e.g. @alice (overrides `client.identity`).
        identity: Option<String>,

        /// Channel to join first (overrides `client.default_channel`).
        #[arg(short, long)]
        channel: Option<String>,
    },

    /// Send one message and exit.
    Send {
        /// Comma-separated recipients, e.g. "general,@bob".
        recipients: String,

        /// Message body.
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Identity to send as (overrides `client.identity`).
        #[arg(long = "as")]
        identity: Option<String>,
    },

    /// Run an auto-responding bot on one channel.
    Bot {
        /// Bot identity, e.g. @@bot (overrides `bot.identity`).
        identity: Option<String>,

        /// Channel to watch (overrides `bot.channel`).
        #[arg(short, long)]
        channel: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
