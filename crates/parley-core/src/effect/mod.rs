//! Channel side effects: logic run after fan-out on special channels.
//!
//! - `handler` -- `ChannelEffect` trait and the type-erased `BoxChannelEffect`
//! - `registry` -- `EffectRegistry` mapping channel names to effects
//! - `disabled` -- fixed-notice effect for switched-off backends
//! - `inference` -- lazily built completion backend for the `llm` channel
//! - `robot` -- structured-command / free-text forwarding for the `robot` channel

pub mod disabled;
pub mod handler;
pub mod inference;
pub mod registry;
pub mod robot;

pub use handler::{BoxChannelEffect, ChannelEffect};
pub use registry::EffectRegistry;
