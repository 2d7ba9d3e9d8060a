use thiserror::Error;

/// Errors from validating user-submitted intake fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("required intake field '{0}' is empty")]
    MissingField(&'static str),
}

/// Errors from repository operations (used by trait definitions in solace-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from session lifecycle operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("conversation has not been started")]
    NotActive,

    #[error("conversation is already active")]
    AlreadyActive,

    #[error("an exchange is already in progress for this session")]
    ExchangeInProgress,

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
