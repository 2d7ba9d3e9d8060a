//! Shared domain types for Solace.
//!
//! This crate contains the core domain types used across the Solace service:
//! intake profiles, chat messages, session records, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod error;
pub mod intake;
