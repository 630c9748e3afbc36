//! Error handling

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::logic::completion::CompletionError;
use crate::logic::detector::DetectionError;
use crate::logic::recommendation::RecommendationError;
use crate::models::DatasetError;

pub type AppResult<T> = Result<T, AppError>;

/// Validation code attached to blank incident descriptions
pub const EMPTY_DESCRIPTION_CODE: &str = "empty_incident_description";

#[derive(Debug)]
pub enum AppError {
    // Validation errors
    EmptyIncidentDescription,
    NoNumericColumns,
    ValidationError(String),
    MalformedInput(String),

    // Resource errors
    NotFound(String),

    // External service errors
    ConfigurationMissing(String),
    NetworkUnavailable(String),
    ExternalServiceError(String),

    // Generic errors
    InternalError(String),
}

impl AppError {
    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::EmptyIncidentDescription => "empty_incident_description",
            AppError::NoNumericColumns => "no_numeric_columns",
            AppError::ValidationError(_) => "validation_error",
            AppError::MalformedInput(_) => "malformed_input",
            AppError::NotFound(_) => "not_found",
            AppError::ConfigurationMissing(_) => "configuration_missing",
            AppError::NetworkUnavailable(_) => "network_unavailable",
            AppError::ExternalServiceError(_) => "external_service_error",
            AppError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, error_message) = match &self {
            AppError::EmptyIncidentDescription => {
                (StatusCode::BAD_REQUEST, "Please enter an incident description.")
            }
            AppError::NoNumericColumns => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "The dataset must contain numeric columns for anomaly detection.",
            ),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::MalformedInput(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.as_str()),
            AppError::ConfigurationMissing(msg) => {
                tracing::warn!("Configuration missing: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg.as_str())
            }
            AppError::NetworkUnavailable(msg) => {
                tracing::error!("Network unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Completion service is unreachable")
            }
            AppError::ExternalServiceError(msg) => {
                tracing::error!("External service error: {}", msg);
                (StatusCode::BAD_GATEWAY, "External service error")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "kind": kind,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<CompletionError> for AppError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::MissingApiKey => AppError::ConfigurationMissing(
                "OPENAI_API_KEY is not configured".to_string(),
            ),
            CompletionError::Network(_) | CompletionError::Timeout(_) => {
                AppError::NetworkUnavailable(err.to_string())
            }
            CompletionError::Unauthorized(_)
            | CompletionError::Server { .. }
            | CompletionError::MalformedResponse(_) => {
                AppError::ExternalServiceError(err.to_string())
            }
        }
    }
}

impl From<RecommendationError> for AppError {
    fn from(err: RecommendationError) -> Self {
        match err {
            RecommendationError::EmptyDescription => AppError::EmptyIncidentDescription,
            RecommendationError::Completion(e) => e.into(),
        }
    }
}

impl From<DatasetError> for AppError {
    fn from(err: DatasetError) -> Self {
        AppError::MalformedInput(err.to_string())
    }
}

impl From<DetectionError> for AppError {
    fn from(err: DetectionError) -> Self {
        match err {
            DetectionError::NoNumericColumns => AppError::NoNumericColumns,
            DetectionError::NonFiniteValue { .. } => AppError::MalformedInput(err.to_string()),
            DetectionError::InvalidParameters(msg) => AppError::ValidationError(msg),
            DetectionError::Model(e) => AppError::InternalError(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let blank_description = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .any(|e| e.code == EMPTY_DESCRIPTION_CODE);

        if blank_description {
            AppError::EmptyIncidentDescription
        } else {
            AppError::ValidationError(errors.to_string())
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (AppError::EmptyIncidentDescription, StatusCode::BAD_REQUEST),
            (AppError::NoNumericColumns, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::ConfigurationMissing("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::ExternalServiceError("x".into()), StatusCode::BAD_GATEWAY),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_completion_error_classification() {
        assert_eq!(AppError::from(CompletionError::MissingApiKey).kind(), "configuration_missing");
        assert_eq!(AppError::from(CompletionError::Timeout(30)).kind(), "network_unavailable");
        assert_eq!(
            AppError::from(CompletionError::MalformedResponse("no choices".into())).kind(),
            "external_service_error"
        );
    }
}
