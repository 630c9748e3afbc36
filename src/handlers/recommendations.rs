//! Recommendation handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

use crate::{AppState, AppResult};
use crate::models::{Recommendation, RecommendationRequest};

/// Generate maintenance recommendations for an incident description
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<Recommendation>> {
    let Json(req) = payload?;
    req.validate()?;

    let recommendation = state.recommender
        .generate(&req.incident_description)
        .await?;

    Ok(Json(recommendation))
}
