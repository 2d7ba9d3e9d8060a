//! Infrastructure implementations for Solace.
//!
//! Implements the repository traits defined in `solace-core` against
//! SQLite via sqlx.

pub mod sqlite;
