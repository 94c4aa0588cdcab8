//! Infrastructure layer for Parley.
//!
//! Contains the concrete collaborators behind the traits defined in
//! `parley-core`: the config file loader, HTTP inference and robot backends,
//! and the WebSocket client transport.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod robot;
pub mod transport;
