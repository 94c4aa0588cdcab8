//! Client transports that reach a server over the network.

pub mod ws;

pub use ws::{ServerInfo, WsTransport};
