//! Completion Service
//!
//! Remote text generation behind a trait, so the recommendation flow can
//! run against the hosted API or a stand-in.

pub mod client;

use async_trait::async_trait;

pub use client::{CompletionConfig, CompletionError, OpenAiClient};

/// Generated text plus the model that produced it
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub model: String,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one user prompt and return the first choice's text
    async fn complete(&self, prompt: &str) -> Result<Completion, CompletionError>;
}
