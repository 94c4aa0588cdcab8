//! HTTP layer: the WebSocket endpoint clients connect to plus a health probe.

pub mod handlers;
pub mod router;
