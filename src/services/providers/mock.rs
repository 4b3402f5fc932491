//! Mock answer provider for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{AnswerProvider, ProviderError};

enum MockOutcome {
    Echo,
    Canned(String),
    Failure,
}

/// Mock answer provider with a fixed outcome and a call counter.
pub struct MockAnswerProvider {
    outcome: MockOutcome,
    calls: AtomicUsize,
}

impl MockAnswerProvider {
    /// Echoes the question back inside a canned prefix.
    pub fn new() -> Self {
        Self {
            outcome: MockOutcome::Echo,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answers with the given text.
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            outcome: MockOutcome::Canned(answer.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails with an API error.
    pub fn failing() -> Self {
        Self {
            outcome: MockOutcome::Failure,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `answer` has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockAnswerProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerProvider for MockAnswerProvider {
    async fn answer(&self, question: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.outcome {
            MockOutcome::Echo => Ok(format!("Mock answer for: {}", question)),
            MockOutcome::Canned(answer) => Ok(answer.clone()),
            MockOutcome::Failure => {
                Err(ProviderError::ApiError("mock provider failure".to_string()))
            }
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
