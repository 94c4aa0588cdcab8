//! Inference backends for the `llm` channel.

pub mod anthropic;

pub use anthropic::AnthropicCompleter;
