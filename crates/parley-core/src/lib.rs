//! Routing, fan-out, and client logic for Parley.
//!
//! This crate holds everything that decides what happens to a message. It
//! depends only on `parley-types`; sockets, HTTP backends, and config files
//! live in `parley-infra`.

pub mod admin;
pub mod client;
pub mod effect;
pub mod message;
pub mod recipient;
pub mod transport;
