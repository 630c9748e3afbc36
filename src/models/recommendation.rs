//! Recommendation models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::EMPTY_DESCRIPTION_CODE;

#[derive(Debug, Deserialize, Validate)]
pub struct RecommendationRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 10000, message = "Incident description is too long")
    )]
    pub incident_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub recommendation: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(EMPTY_DESCRIPTION_CODE));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_description_rejected() {
        for text in ["", "   ", "\n\t "] {
            let req = RecommendationRequest {
                incident_description: text.to_string(),
            };
            let errors = req.validate().unwrap_err();
            let fields = errors.field_errors();
            assert_eq!(fields["incident_description"][0].code, EMPTY_DESCRIPTION_CODE);
        }
    }

    #[test]
    fn test_description_accepted() {
        let req = RecommendationRequest {
            incident_description: "Hydraulic pressure drop on gear retraction".to_string(),
        };
        assert!(req.validate().is_ok());
    }
}
