//! Client-side logic shared by every front-end.
//!
//! - `repl` -- REPL command interpreter and channel state machine
//! - `responder` -- auto-replying bot bound to one channel
//! - `local` -- in-process `ChatTransport` over a router and topic bus

pub mod local;
pub mod repl;
pub mod responder;

pub use local::LocalTransport;
pub use repl::{ReplCommand, ReplOutcome, ReplSession};
pub use responder::BotResponder;
