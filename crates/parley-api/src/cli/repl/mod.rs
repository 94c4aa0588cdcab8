//! Interactive chat client.
//!
//! Entry point: `loop_runner::run_repl`. Line interpretation lives in
//! `parley_core::client::repl`; this module only does terminal I/O.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
