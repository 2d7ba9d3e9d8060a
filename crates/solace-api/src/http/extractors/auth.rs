//! Bearer-token authentication extractor.
//!
//! Extracts the token from `Authorization: Bearer <token>`, SHA-256
//! hashes it, and resolves the owning user from the `api_tokens` table.
//! Handlers that take a `CurrentUser` argument are therefore only
//! reachable with a valid token; everything else is routed away with 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use sqlx::Row;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated user behind the request. Extracting this validates
/// the bearer token.
pub struct CurrentUser(pub Uuid);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;
        let token_hash = hash_token(&token);

        let row = sqlx::query("SELECT id, user_id FROM api_tokens WHERE token_hash = ?")
            .bind(&token_hash)
            .fetch_optional(&state.db_pool.reader)
            .await
            .map_err(|e| AppError::Internal(format!("Database error: {e}")))?;

        match row {
            Some(row) => {
                let user_id: String = row.get("user_id");
                let user_id = user_id
                    .parse::<Uuid>()
                    .map_err(|e| AppError::Internal(format!("invalid stored user_id: {e}")))?;

                // Update last_used_at (best effort, don't fail the request)
                let id: String = row.get("id");
                let now = chrono::Utc::now().to_rfc3339();
                let _ = sqlx::query("UPDATE api_tokens SET last_used_at = ? WHERE id = ?")
                    .bind(&now)
                    .bind(&id)
                    .execute(&state.db_pool.writer)
                    .await;

                Ok(CurrentUser(user_id))
            }
            None => Err(AppError::Unauthorized(
                "Invalid token. Provide a valid token via 'Authorization: Bearer <token>'."
                    .to_string(),
            )),
        }
    }
}

/// Extract the bearer token from the Authorization header.
fn extract_bearer_token(parts: &Parts) -> Result<String, AppError> {
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    Err(AppError::Unauthorized(
        "Missing token. Provide via 'Authorization: Bearer <token>' header.".to_string(),
    ))
}

/// Compute the SHA-256 hash of a token (lowercase hex).
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{digest:x}")
}

/// Provision a new user and API token.
///
/// Returns the user id and the plaintext token (shown once; only its
/// hash is stored).
pub async fn create_token(state: &AppState) -> anyhow::Result<(Uuid, String)> {
    use rand::Rng;

    let mut token_bytes = [0u8; 32];
    rand::thread_rng().fill(&mut token_bytes[..]);
    let plaintext = format!(
        "solace_{}",
        token_bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>()
    );

    let user_id = Uuid::now_v7();
    let id = Uuid::now_v7();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query("INSERT INTO api_tokens (id, user_id, token_hash, created_at) VALUES (?, ?, ?, ?)")
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(hash_token(&plaintext))
        .bind(&now)
        .execute(&state.db_pool.writer)
        .await?;

    Ok((user_id, plaintext))
}
