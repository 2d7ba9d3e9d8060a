//! Message exchange HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/sessions/{id}/messages - Submit a user message, get the reply
//! - GET  /api/v1/sessions/{id}/messages - Get the ordered message history

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use solace_types::chat::ChatMessage;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitMessageRequest {
    pub text: String,
}

/// One exchange: the recorded user message and the generated reply.
#[derive(Debug, Serialize)]
pub struct ExchangeResponse {
    pub user_message: ChatMessage,
    pub reply: ChatMessage,
}

fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// POST /api/v1/sessions/{id}/messages - Submit a user message.
///
/// Blank or whitespace-only text is rejected here; the conversation core
/// appends whatever it is given.
pub async fn submit_message(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(session_id): Path<String>,
    Json(req): Json<SubmitMessageRequest>,
) -> Result<Json<ApiResponse<ExchangeResponse>>, AppError> {
    let sid = parse_uuid(&session_id)?;
    super::session::owned_session(&state, user_id, &sid).await?;

    if req.text.trim().is_empty() {
        return Err(AppError::Validation(
            "Message text must not be empty".to_string(),
        ));
    }

    let (user_message, reply) = state.session_service.submit_message(&sid, &req.text).await?;

    Ok(Json(ApiResponse::success(ExchangeResponse {
        user_message,
        reply,
    })))
}

/// GET /api/v1/sessions/{id}/messages - Get the session's message history.
pub async fn get_messages(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let sid = parse_uuid(&session_id)?;
    super::session::owned_session(&state, user_id, &sid).await?;

    let messages = state.session_service.get_messages(&sid).await?;
    Ok(Json(ApiResponse::success(messages)))
}
