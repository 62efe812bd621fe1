//! HTTP request handlers

use super::types::{
    AskRequest, AskResponse, ChatRequest, ChatResponse, ErrorResponse, ModelsResponse,
    SessionResponse,
};
use super::AppState;
use crate::conversation::{Transcript, TranscriptError};
use crate::llm::LlmService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Sessions
        .route("/api/sessions/new", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/reset", post(reset_session))
        // Stateless answer
        .route("/api/ask", post(ask))
        // Model info
        .route("/api/models", get(list_models))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let session_id = state.sessions.create().await;
    Json(SessionResponse {
        session_id,
        messages: Transcript::new(),
    })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| AppError::session_not_found(&id))?;

    let messages = session.lock().await.clone();
    Ok(Json(SessionResponse {
        session_id: id,
        messages,
    }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::session_not_found(&id))
    }
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| AppError::session_not_found(&id))?;

    // Held for the whole turn so turns in one session never interleave
    let mut transcript = session.lock().await;
    let reply = transcript
        .append_turn(state.responder.as_ref(), &req.text)
        .await?
        .content()
        .to_string();

    tracing::info!(session_id = %id, messages = transcript.len(), "Turn completed");

    Ok(Json(ChatResponse {
        reply,
        messages: transcript.clone(),
    }))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| AppError::session_not_found(&id))?;

    let mut transcript = session.lock().await;
    transcript.reset();
    tracing::info!(session_id = %id, "Session reset");

    Ok(Json(SessionResponse {
        session_id: id,
        messages: transcript.clone(),
    }))
}

// ============================================================
// Stateless answer
// ============================================================

async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    if req.query.trim().is_empty() {
        return Err(AppError::BadRequest("Query cannot be empty".to_string()));
    }
    let answer = state.responder.respond(&req.query).await;
    Ok(Json(AskResponse { answer }))
}

// ============================================================
// Model info
// ============================================================

async fn list_models(State(state): State<AppState>) -> Result<Json<ModelsResponse>, AppError> {
    let models = state
        .gemini
        .list_models()
        .await
        .map_err(|e| AppError::BadGateway(e.to_string()))?;

    Ok(Json(ModelsResponse {
        current: state.gemini.model_id().to_string(),
        models,
    }))
}

async fn get_version() -> &'static str {
    concat!("omegaveo ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
}

impl AppError {
    fn session_not_found(id: &str) -> Self {
        AppError::NotFound(format!("Session not found: {id}"))
    }
}

impl From<TranscriptError> for AppError {
    fn from(e: TranscriptError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
