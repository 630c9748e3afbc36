//! Reports handlers

use axum::{extract::State, Json};

use crate::AppState;
use crate::models::ReportLink;

/// External reporting dashboard link
pub async fn link(State(state): State<AppState>) -> Json<ReportLink> {
    Json(ReportLink::new(state.config.report_url.clone()))
}
