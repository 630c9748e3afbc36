//! Chat Completion API Client
//!
//! HTTP client for an OpenAI-compatible `/chat/completions` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::{Completion, CompletionClient};
use crate::config::Config;

/// Pause before retrying a transient failure
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Completion service configuration
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

impl From<&Config> for CompletionConfig {
    fn from(config: &Config) -> Self {
        Self {
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
            model: config.openai_model.clone(),
            timeout_seconds: config.completion_timeout_secs,
            max_retries: config.completion_max_retries,
        }
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion API key is not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Completion service rejected the API key ({0})")]
    Unauthorized(u16),

    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Unexpected completion response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    /// Failures worth one more attempt
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Server { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible completion client
pub struct OpenAiClient {
    config: CompletionConfig,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    /// Create new completion client
    pub fn new(config: CompletionConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, http_client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn send_once(&self, api_key: &str, request: &ChatCompletionRequest<'_>) -> Result<Completion, CompletionError> {
        let response = self.http_client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout(self.config.timeout_seconds)
                } else {
                    CompletionError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CompletionError::Unauthorized(status.as_u16()));
        }

        let body = response.text().await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(CompletionError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        let choice = parsed.choices.into_iter().next()
            .ok_or_else(|| CompletionError::MalformedResponse("response contained no choices".to_string()))?;

        let text = choice.message.content
            .ok_or_else(|| CompletionError::MalformedResponse("first choice has no content".to_string()))?;

        Ok(Completion {
            text,
            model: parsed.model.unwrap_or_else(|| self.config.model.clone()),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<Completion, CompletionError> {
        let api_key = self.config.api_key.as_deref()
            .ok_or(CompletionError::MissingApiKey)?;

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        };

        let mut attempt = 0;
        loop {
            match self.send_once(api_key, &request).await {
                Ok(completion) => return Ok(completion),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(attempt, "Completion request failed, retrying: {}", e);
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                Err(e) => {
                    tracing::error!("Completion request failed: {}", e);
                    return Err(e);
                }
            }
        }
    }
}
