//! SQLite session repository implementation.
//!
//! Implements `SessionRepository` from `solace-core` using sqlx with the
//! split read/write pools: raw queries, private Row structs, intake fields
//! flattened into the `chat_sessions` table.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use solace_core::session::repository::SessionRepository;
use solace_types::chat::{ChatMessage, ChatSession, Sender, SessionStatus};
use solace_types::error::RepositoryError;
use solace_types::intake::IntakeInfo;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionRepository`.
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatSessionRow {
    id: String,
    user_id: String,
    name: String,
    feelings: String,
    concerns: String,
    support_type: String,
    started_at: String,
    ended_at: Option<String>,
    message_count: i64,
    status: String,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            feelings: row.try_get("feelings")?,
            concerns: row.try_get("concerns")?,
            support_type: row.try_get("support_type")?,
            started_at: row.try_get("started_at")?,
            ended_at: row.try_get("ended_at")?,
            message_count: row.try_get("message_count")?,
            status: row.try_get("status")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;
        let started_at = parse_datetime(&self.started_at)?;
        let ended_at = self.ended_at.as_deref().map(parse_datetime).transpose()?;
        let status: SessionStatus = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        // Stored values passed validation on the way in.
        let intake = IntakeInfo::new(self.name, self.feelings, self.concerns, self.support_type)
            .map_err(|e| RepositoryError::Query(format!("invalid stored intake: {e}")))?;

        Ok(ChatSession {
            id,
            user_id,
            intake,
            started_at,
            ended_at,
            message_count: self.message_count as u32,
            status,
        })
    }
}

struct ChatMessageRow {
    id: String,
    sender: String,
    text: String,
    timestamp: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            sender: row.try_get("sender")?,
            text: row.try_get("text")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let sender: Sender = self
            .sender
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let timestamp = parse_datetime(&self.timestamp)?;

        Ok(ChatMessage {
            id,
            text: self.text,
            sender,
            timestamp,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// SessionRepository implementation
// ---------------------------------------------------------------------------

impl SessionRepository for SqliteSessionRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_sessions (id, user_id, name, feelings, concerns, support_type, started_at, ended_at, message_count, status)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(&session.intake.name)
        .bind(&session.intake.feelings)
        .bind(&session.intake.concerns)
        .bind(&session.intake.support_type)
        .bind(format_datetime(&session.started_at))
        .bind(session.ended_at.as_ref().map(format_datetime))
        .bind(session.message_count as i64)
        .bind(session.status.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn update_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE chat_sessions
               SET ended_at = ?, message_count = ?, status = ?
               WHERE id = ?"#,
        )
        .bind(session.ended_at.as_ref().map(format_datetime))
        .bind(session.message_count as i64)
        .bind(session.status.to_string())
        .bind(session.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_sessions(&self, user_id: &Uuid) -> Result<Vec<ChatSession>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM chat_sessions WHERE user_id = ? ORDER BY started_at DESC")
                .bind(user_id.to_string())
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_row =
                ChatSessionRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            sessions.push(session_row.into_session()?);
        }

        Ok(sessions)
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn save_message(
        &self,
        session_id: &Uuid,
        message: &ChatMessage,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_messages (id, session_id, sender, text, timestamp)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(session_id.to_string())
        .bind(message.sender.to_string())
        .bind(&message.text)
        .bind(format_datetime(&message.timestamp))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Keep the denormalized count on the session in step
        sqlx::query("UPDATE chat_sessions SET message_count = message_count + 1 WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_messages(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY timestamp ASC, id ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row =
                ChatMessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn get_message_count(&self, session_id: &Uuid) -> Result<u32, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_messages WHERE session_id = ?")
            .bind(session_id.to_string())
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u32)
    }
}
