//! Server-side messaging: topic naming, the in-process bus, envelopes,
//! the bot loop guard, and the router.
//!
//! - `bus` -- `TopicBus` broadcast hub and per-client `Subscriptions`
//! - `envelope` -- constructors for `ChatMessage`
//! - `guard` -- `LoopGuard` and the reply sentinel
//! - `router` -- `MessageRouter` with the admin override and channel effects
//! - `topic` -- `<topic_base>/<name>` topic naming

pub mod bus;
pub mod envelope;
pub mod guard;
pub mod router;
pub mod topic;

pub use bus::{Subscriptions, TopicBus};
pub use guard::LoopGuard;
pub use router::{MessageRouter, RouteOutcome};
