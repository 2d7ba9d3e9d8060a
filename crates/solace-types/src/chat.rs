//! Chat session and message types for Solace.
//!
//! These types model one scripted conversation: the session record keyed
//! by its owning user, and the append-only message history inside it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::intake::IntakeInfo;

/// Author of a chat message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (sender IN ('user', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "assistant" => Ok(Sender::Assistant),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// Lifecycle status of a chat session.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (status IN ('active', 'ended'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Ended,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Ended => write!(f, "ended"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(SessionStatus::Active),
            "ended" => Ok(SessionStatus::Ended),
            other => Err(format!("invalid session status: '{other}'")),
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Active
    }
}

/// A single message within a chat session.
///
/// Messages are immutable after creation. Ids are UUIDv7, so sorting by
/// id matches creation order within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Build a message with a fresh time-sortable id.
    pub fn new(text: impl Into<String>, sender: Sender, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            text: text.into(),
            sender,
            timestamp,
        }
    }
}

/// A chat session between one user and the scripted responder.
///
/// Owns the intake profile collected at the start of the session and
/// tracks the session lifetime and message count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    /// Opaque id of the authenticated user who owns this session.
    pub user_id: Uuid,
    pub intake: IntakeInfo,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub message_count: u32,
    pub status: SessionStatus,
}

impl ChatSession {
    /// Start a new active session for a user with the given intake.
    pub fn new(user_id: Uuid, intake: IntakeInfo, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            intake,
            started_at,
            ended_at: None,
            message_count: 0,
            status: SessionStatus::Active,
        }
    }
}
