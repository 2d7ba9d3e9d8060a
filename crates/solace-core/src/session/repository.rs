//! SessionRepository trait definition.
//!
//! The persistence port for session records and their messages.
//! Implementations live in solace-infra (e.g., `SqliteSessionRepository`).
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use solace_types::chat::{ChatMessage, ChatSession};
use solace_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat session and message persistence.
pub trait SessionRepository: Send + Sync {
    /// Create a new session record.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get a session by its unique ID.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// Update an existing session (status, end timestamp).
    fn update_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List sessions owned by a user, ordered by started_at DESC.
    fn list_sessions(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Delete a session and its messages.
    fn delete_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Save a new message within a session.
    fn save_message(
        &self,
        session_id: &Uuid,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get messages for a session, ordered by timestamp ASC.
    fn get_messages(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Total number of messages in a session.
    fn get_message_count(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u32, RepositoryError>> + Send;
}
