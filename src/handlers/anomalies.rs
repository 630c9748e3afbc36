//! Anomaly detection handlers

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use super::datasets::session_not_found;
use crate::{AppState, AppResult, AppError};
use crate::logic::detector::detect_anomalies;
use crate::models::{AnomalyReport, Dataset, DetectionParams};

/// Run detection on a session's dataset and keep the result
pub async fn detect(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    query: Result<Query<DetectionParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = query?;
    let params = params.into_params()?;
    let dataset = state.sessions
        .dataset(id)
        .ok_or_else(|| session_not_found(id))?;

    let report = tokio::task::spawn_blocking(move || detect_anomalies(&dataset, params)).await??;

    let report = state.sessions
        .record_result(id, report)
        .ok_or_else(|| session_not_found(id))?;

    Ok(Json(&*report).into_response())
}

/// Last detection result of a session
pub async fn latest(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    if state.sessions.summary(id).is_none() {
        return Err(session_not_found(id));
    }

    let report = state.sessions
        .last_result(id)
        .ok_or_else(|| AppError::NotFound("Anomaly detection has not been run for this dataset".to_string()))?;

    Ok(Json(&*report).into_response())
}

/// Parse a CSV body and detect anomalies without opening a session
pub async fn detect_upload(
    query: Result<Query<DetectionParams>, QueryRejection>,
    body: Bytes,
) -> AppResult<Json<AnomalyReport>> {
    let Query(params) = query?;
    let params = params.into_params()?;

    let report = tokio::task::spawn_blocking(move || -> AppResult<AnomalyReport> {
        let dataset = Dataset::from_csv_bytes(&body)?;
        Ok(detect_anomalies(&dataset, params)?)
    })
    .await??;

    Ok(Json(report))
}
