//! Diagnose HTTP Routes
//!
//! Thin JSON adapters over `DiagnosisService`. Errors carry a stable code and
//! a user-facing message; internal detail stays in the logs.

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Serialize;

use crate::engine::{
    AnswerRequest, AnswerResponse, AnswerTextRequest, CategoryRequest, CategoryResponse,
    DiagnosisError, DiagnosisService, SessionSnapshot,
};
use crate::store::SessionStore;

/// Store handle chosen at startup
pub type SharedStore = Arc<dyn SessionStore>;

pub struct DiagnoseState {
    pub service: DiagnosisService<SharedStore>,
}

impl DiagnoseState {
    pub fn new(service: DiagnosisService<SharedStore>) -> Self {
        Self { service }
    }
}

pub fn diagnose_routes(state: Arc<DiagnoseState>) -> Router {
    Router::new()
        .route("/category", post(category_handler))
        .route("/answer", post(answer_handler))
        .route("/answer-text", post(answer_text_handler))
        .route("/session/:id", get(session_handler))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub message: String,
    pub retryable: bool,
}

impl From<&DiagnosisError> for ErrorResponse {
    fn from(err: &DiagnosisError) -> Self {
        Self {
            error: err.code().to_string(),
            code: err.status_code(),
            message: err.user_message().to_string(),
            retryable: err.is_retryable(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: DiagnosisError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(&err)))
}

async fn category_handler(
    State(state): State<Arc<DiagnoseState>>,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    state
        .service
        .select_category(request)
        .map(|response| (StatusCode::CREATED, Json(response)))
        .map_err(api_error)
}

async fn answer_handler(
    State(state): State<Arc<DiagnoseState>>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    state.service.submit_answer(request).map(Json).map_err(api_error)
}

async fn answer_text_handler(
    State(state): State<Arc<DiagnoseState>>,
    Json(request): Json<AnswerTextRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    state
        .service
        .submit_free_text(request)
        .map(Json)
        .map_err(api_error)
}

async fn session_handler(
    State(state): State<Arc<DiagnoseState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state.service.snapshot(&id).map(Json).map_err(api_error)
}
