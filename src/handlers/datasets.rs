//! Dataset session handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{AppState, AppResult, AppError};
use crate::models::{Dataset, DatasetSummary};

/// Upload a CSV file and open a session for it
pub async fn upload(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<DatasetSummary>)> {
    let dataset = tokio::task::spawn_blocking(move || Dataset::from_csv_bytes(&body)).await??;
    let summary = state.sessions.create(dataset);

    Ok((StatusCode::CREATED, Json(summary)))
}

/// Get session summary and preview
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DatasetSummary>> {
    let summary = state.sessions
        .summary(id)
        .ok_or_else(|| session_not_found(id))?;

    Ok(Json(summary))
}

/// Drop a session
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.sessions.remove(id) {
        return Err(session_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Dataset session {} not found", id))
}
