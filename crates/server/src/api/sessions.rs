//! Session API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use plotguess_core::{FeedbackDraft, FeedbackError, ResultField, SessionError, SessionSnapshot};

use crate::registry::SessionRef;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body carrying input text
#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub text: String,
}

/// Request body for selecting a suggestion
#[derive(Debug, Deserialize)]
pub struct SelectBody {
    /// Dropdown label of the suggestion
    pub label: String,
}

/// Response for session operations
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub created_at: String,
    pub session: SessionSnapshot,
}

impl SessionResponse {
    fn new(session: &SessionRef, snapshot: SessionSnapshot) -> Self {
        Self {
            id: session.id.clone(),
            created_at: session.created_at.to_rfc3339(),
            session: snapshot,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct SessionErrorResponse {
    pub error: String,
}

/// Errors returned by session handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Session(SessionError),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Session(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::NotFound(id) => (StatusCode::NOT_FOUND, format!("Session not found: {}", id)),
            ApiError::Session(err) => {
                let status = match &err {
                    SessionError::UnknownCandidate(_)
                    | SessionError::UnknownField(_)
                    | SessionError::Feedback(FeedbackError::EmptyFeedback) => {
                        StatusCode::BAD_REQUEST
                    }
                    SessionError::InvalidStage { .. }
                    | SessionError::NoResult
                    | SessionError::EvaluationInFlight
                    | SessionError::Feedback(FeedbackError::InFlight) => StatusCode::CONFLICT,
                    SessionError::Closed => StatusCode::GONE,
                    SessionError::Feedback(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, err.to_string())
            }
        };
        (status, Json(SessionErrorResponse { error })).into_response()
    }
}

type ApiResult = Result<Json<SessionResponse>, ApiError>;

async fn find(state: &AppState, id: &str) -> Result<SessionRef, ApiError> {
    state
        .sessions()
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(id.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// Start a new session
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = state.sessions().create().await;
    let snapshot = session.handle.snapshot().await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new(&session, snapshot)),
    ))
}

pub async fn get_session(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let session = find(&state, &id).await?;
    let snapshot = session.handle.snapshot().await?;
    Ok(Json(SessionResponse::new(&session, snapshot)))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.sessions().remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(id))
    }
}

/// A keystroke in the series input
pub async fn series_input(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<TextBody>,
) -> ApiResult {
    let session = find(&state, &id).await?;
    let snapshot = session.handle.series_input(body.text).await?;
    Ok(Json(SessionResponse::new(&session, snapshot)))
}

pub async fn select_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<SelectBody>,
) -> ApiResult {
    let session = find(&state, &id).await?;
    let snapshot = session.handle.select(body.label).await?;
    Ok(Json(SessionResponse::new(&session, snapshot)))
}

pub async fn guess_input(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<TextBody>,
) -> ApiResult {
    let session = find(&state, &id).await?;
    let snapshot = session.handle.guess_input(body.text).await?;
    Ok(Json(SessionResponse::new(&session, snapshot)))
}

/// Submit the current guess; the result arrives asynchronously
pub async fn submit_guess(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let session = find(&state, &id).await?;
    let snapshot = session.handle.submit().await?;
    Ok(Json(SessionResponse::new(&session, snapshot)))
}

pub async fn toggle_reveal(
    State(state): State<Arc<AppState>>,
    Path((id, field)): Path<(String, String)>,
) -> ApiResult {
    let session = find(&state, &id).await?;
    let field: ResultField = field.parse().map_err(SessionError::from)?;
    let snapshot = session.handle.toggle_reveal(field).await?;
    Ok(Json(SessionResponse::new(&session, snapshot)))
}

pub async fn reveal_all(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let session = find(&state, &id).await?;
    let snapshot = session.handle.reveal_all().await?;
    Ok(Json(SessionResponse::new(&session, snapshot)))
}

pub async fn hide_all(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let session = find(&state, &id).await?;
    let snapshot = session.handle.hide_all().await?;
    Ok(Json(SessionResponse::new(&session, snapshot)))
}

pub async fn new_guess(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let session = find(&state, &id).await?;
    let snapshot = session.handle.new_guess().await?;
    Ok(Json(SessionResponse::new(&session, snapshot)))
}

pub async fn dismiss_notice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let session = find(&state, &id).await?;
    let snapshot = session.handle.dismiss_notice().await?;
    Ok(Json(SessionResponse::new(&session, snapshot)))
}

pub async fn open_feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let session = find(&state, &id).await?;
    let snapshot = session.handle.open_feedback().await?;
    Ok(Json(SessionResponse::new(&session, snapshot)))
}

pub async fn close_feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let session = find(&state, &id).await?;
    let snapshot = session.handle.close_feedback().await?;
    Ok(Json(SessionResponse::new(&session, snapshot)))
}

/// Submit feedback; delivery happens in the background
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(draft): Json<FeedbackDraft>,
) -> ApiResult {
    let session = find(&state, &id).await?;
    let snapshot = session.handle.submit_feedback(draft).await.map_err(|e| {
        warn!("Feedback rejected for session {}: {}", id, e);
        e
    })?;
    Ok(Json(SessionResponse::new(&session, snapshot)))
}
