//! Session lifecycle HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions          - Start a session from an intake form
//! - GET    /api/v1/sessions          - List the caller's sessions
//! - GET    /api/v1/sessions/{id}     - Get a single session
//! - POST   /api/v1/sessions/{id}/end - End a session, keeping the record
//! - DELETE /api/v1/sessions/{id}     - Reset: delete the session and its messages

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use solace_types::chat::{ChatMessage, ChatSession};
use solace_types::intake::IntakeInfo;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Intake form payload: all four fields are required non-empty.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub name: String,
    pub feelings: String,
    pub concerns: String,
    pub support_type: String,
}

/// A started session together with its opening message.
#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session: ChatSession,
    pub opening: ChatMessage,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// Fetch a session and enforce that the caller owns it.
///
/// Foreign sessions are indistinguishable from missing ones (404).
pub(crate) async fn owned_session(
    state: &AppState,
    user_id: Uuid,
    session_id: &Uuid,
) -> Result<ChatSession, AppError> {
    let session = state
        .session_service
        .get_session(session_id)
        .await?
        .filter(|s| s.user_id == user_id)
        .ok_or(AppError::Session(solace_types::error::SessionError::NotFound))?;
    Ok(session)
}

/// POST /api/v1/sessions - Start a session from a validated intake form.
pub async fn start_session(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<ApiResponse<StartSessionResponse>>, AppError> {
    let intake = IntakeInfo::new(req.name, req.feelings, req.concerns, req.support_type)?;

    let (session, opening) = state.session_service.start_session(user_id, intake).await?;

    Ok(Json(ApiResponse::success(StartSessionResponse {
        session,
        opening,
    })))
}

/// GET /api/v1/sessions - List the caller's sessions, most recent first.
pub async fn list_sessions(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<Vec<ChatSession>>>, AppError> {
    let sessions = state.session_service.list_sessions(&user_id).await?;
    Ok(Json(ApiResponse::success(sessions)))
}

/// GET /api/v1/sessions/{id} - Get one of the caller's sessions.
pub async fn get_session(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<ChatSession>>, AppError> {
    let sid = parse_uuid(&session_id)?;
    let session = owned_session(&state, user_id, &sid).await?;
    Ok(Json(ApiResponse::success(session)))
}

/// POST /api/v1/sessions/{id}/end - End a session, keeping its record.
pub async fn end_session(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let sid = parse_uuid(&session_id)?;
    owned_session(&state, user_id, &sid).await?;

    state.session_service.end_session(&sid).await?;
    Ok(Json(ApiResponse::success(serde_json::json!({
        "ended": true,
        "session_id": session_id,
    }))))
}

/// DELETE /api/v1/sessions/{id} - Reset: discard the session entirely.
pub async fn delete_session(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let sid = parse_uuid(&session_id)?;
    owned_session(&state, user_id, &sid).await?;

    state.session_service.delete_session(&sid).await?;
    Ok(Json(ApiResponse::success(serde_json::json!({
        "deleted": true,
        "session_id": session_id,
    }))))
}
