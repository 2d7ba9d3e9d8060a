//! Session state and lifecycle.
//!
//! `Conversation` is the in-memory state holder for one session;
//! `SessionService` ties live conversations to the persistence port.

pub mod conversation;
pub mod repository;
pub mod service;

pub use conversation::Conversation;
pub use repository::SessionRepository;
pub use service::SessionService;
