//! Shared domain types for Parley.
//!
//! This crate contains the types used across the Parley chat system:
//! identities, chat messages and recipients, wire frames, configuration,
//! and their associated error types.
//!
//! No I/O and no infrastructure dependencies.

pub mod config;
pub mod error;
pub mod frame;
pub mod identity;
pub mod message;
