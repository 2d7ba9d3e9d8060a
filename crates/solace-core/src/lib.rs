//! Business logic and repository trait definitions for Solace.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements. It depends only on `solace-types` -- never on
//! `solace-infra` or any database/IO crate.

pub mod clock;
pub mod responder;
pub mod session;
