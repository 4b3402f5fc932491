//! Answer provider abstraction.
//!
//! A trait-based seam over the generative backend so the HTTP layer can be
//! exercised against a mock without touching the real API.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Stable label for the error counter.
    pub fn error_type(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::NetworkError(_) => "network",
        }
    }
}

/// Trait for question answering backends (e.g. Gemini).
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Answer a question, returning the full response text.
    ///
    /// Implementations that stream internally accumulate the chunks and
    /// return the concatenation; an answer may legitimately be empty.
    async fn answer(&self, question: &str) -> Result<String, ProviderError>;

    /// Provider label for logs and metrics.
    fn name(&self) -> &'static str;

    /// Model label for logs and metrics.
    fn model(&self) -> &str;
}
