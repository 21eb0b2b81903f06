//! Route handler functions for all API endpoints.
//!
//! Each handler extracts query/body parameters via axum extractors,
//! interacts with the session store and conversation controller, and
//! returns JSON responses.

use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use loglens_core::types::Message;
use loglens_data::Table;

use crate::error::ApiError;
use crate::state::AppState;
use crate::ui;

// =============================================================================
// Query parameter and request body types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SessionParams {
    pub session: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ExampleRequest {
    pub session_id: Option<Uuid>,
    pub index: usize,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub sessions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewDto {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatasetResponse {
    pub session_id: Uuid,
    pub rows: usize,
    pub columns: Vec<String>,
    pub preview: PreviewDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExamplesResponse {
    pub questions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_png_base64: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for MessageDto {
    fn from(msg: &Message) -> Self {
        Self {
            id: msg.id,
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
            chart_png_base64: msg.chart.as_deref().map(|png| BASE64.encode(png)),
            created_at: msg.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TurnResponse {
    pub session_id: Uuid,
    pub messages: Vec<MessageDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: Uuid,
    pub messages: Vec<MessageDto>,
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET /health - liveness probe with uptime and session count.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        sessions: state.store.session_count(),
    })
}

/// GET /ui - embedded single-page chat UI.
pub async fn ui_page() -> Html<&'static str> {
    Html(ui::CHAT_HTML)
}

/// POST /sessions - explicitly create a session.
pub async fn create_session(State(state): State<AppState>) -> Result<Json<SessionResponse>, ApiError> {
    let session_id = state.store.initialize(None)?;
    Ok(Json(SessionResponse { session_id }))
}

/// POST /dataset?session=<uuid> - upload a CSV log file (raw request body).
///
/// A parse failure is reported out of band with 400 and leaves session state
/// untouched; a parsed dataset for which no agent can be built is 422 and
/// the previously working dataset/agent pair stays in place.
pub async fn upload_dataset(
    State(state): State<AppState>,
    Query(params): Query<SessionParams>,
    body: String,
) -> Result<Json<DatasetResponse>, ApiError> {
    let session_id = state.store.initialize(params.session)?;

    let table = Table::from_csv_str(&body)?;
    let rows = table.n_rows();
    let columns = table.column_names().to_vec();
    state
        .store
        .load_dataset(session_id, table, &state.config.agent)?;

    let preview = state
        .store
        .preview(session_id, state.config.chat.preview_rows)?
        .map(|p| PreviewDto {
            columns: p.columns,
            rows: p.rows,
        })
        .ok_or_else(|| ApiError::Internal("dataset vanished after load".to_string()))?;

    Ok(Json(DatasetResponse {
        session_id,
        rows,
        columns,
        preview,
    }))
}

/// GET /dataset/preview?session=<uuid> - first rows of the loaded dataset.
pub async fn dataset_preview(
    State(state): State<AppState>,
    Query(params): Query<SessionParams>,
) -> Result<Json<PreviewDto>, ApiError> {
    let session = params
        .session
        .ok_or_else(|| ApiError::BadRequest("Parameter 'session' is required".to_string()))?;

    let preview = state
        .store
        .preview(session, state.config.chat.preview_rows)?
        .ok_or_else(|| ApiError::NotFound("no dataset loaded for this session".to_string()))?;

    Ok(Json(PreviewDto {
        columns: preview.columns,
        rows: preview.rows,
    }))
}

/// GET /examples - the configured example questions.
pub async fn examples(State(state): State<AppState>) -> Json<ExamplesResponse> {
    Json(ExamplesResponse {
        questions: state.controller.example_questions().to_vec(),
    })
}

/// POST /chat - run one free-text question-answer turn.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let session_id = state.store.initialize(req.session_id)?;
    let turn = state.controller.submit(session_id, &req.message)?;
    Ok(Json(TurnResponse {
        session_id,
        messages: turn.messages.iter().map(MessageDto::from).collect(),
    }))
}

/// POST /chat/example - run a turn for a pre-written example question.
///
/// The question flows through the session's pending-question slot and the
/// same submit path as free text.
pub async fn chat_example(
    State(state): State<AppState>,
    Json(req): Json<ExampleRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let session_id = state.store.initialize(req.session_id)?;
    let turn = state.controller.submit_example(session_id, req.index)?;
    Ok(Json(TurnResponse {
        session_id,
        messages: turn.messages.iter().map(MessageDto::from).collect(),
    }))
}

/// GET /history?session=<uuid> - the full transcript.
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<SessionParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let session = params
        .session
        .ok_or_else(|| ApiError::BadRequest("Parameter 'session' is required".to_string()))?;

    let messages = state.store.history(session)?;
    Ok(Json(HistoryResponse {
        session_id: session,
        messages: messages.iter().map(MessageDto::from).collect(),
    }))
}

/// DELETE /history?session=<uuid> - clear the transcript, keep the dataset.
pub async fn clear_history(
    State(state): State<AppState>,
    Query(params): Query<SessionParams>,
) -> Result<axum::http::StatusCode, ApiError> {
    let session = params
        .session
        .ok_or_else(|| ApiError::BadRequest("Parameter 'session' is required".to_string()))?;

    state.store.reset_conversation(session)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
