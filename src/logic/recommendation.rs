//! Maintenance Recommendation Generator

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::logic::completion::{CompletionClient, CompletionError};
use crate::models::Recommendation;

const PROMPT_PREFIX: &str =
    "Based on the following incident description, provide maintenance recommendations: ";

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Please enter an incident description.")]
    EmptyDescription,

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Prompt sent for an incident description
pub fn build_prompt(incident_description: &str) -> String {
    format!("{}{}", PROMPT_PREFIX, incident_description)
}

#[derive(Clone)]
pub struct RecommendationGenerator {
    client: Arc<dyn CompletionClient>,
}

impl RecommendationGenerator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// One completion call per non-blank description; the text is returned as-is
    pub async fn generate(&self, incident_description: &str) -> Result<Recommendation, RecommendationError> {
        if incident_description.trim().is_empty() {
            return Err(RecommendationError::EmptyDescription);
        }

        tracing::info!(chars = incident_description.len(), "Requesting maintenance recommendation");
        let completion = self.client.complete(&build_prompt(incident_description)).await?;

        Ok(Recommendation {
            recommendation: completion.text,
            model: completion.model,
            generated_at: Utc::now(),
        })
    }
}
