//! Mock identity provider for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{IdentityError, IdentityProfile, IdentityProvider};

enum MockOutcome {
    Profile(IdentityProfile),
    Failure,
}

/// Mock identity provider with a fixed outcome and a call counter.
pub struct MockIdentityProvider {
    outcome: MockOutcome,
    calls: AtomicUsize,
}

impl MockIdentityProvider {
    /// Always hands back the given profile.
    pub fn returning(profile: IdentityProfile) -> Self {
        Self {
            outcome: MockOutcome::Profile(profile),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails the exchange.
    pub fn failing() -> Self {
        Self {
            outcome: MockOutcome::Failure,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `fetch_profile` has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn fetch_profile(
        &self,
        _code: &str,
        _code_verifier: &str,
        _redirect_uri: &str,
    ) -> Result<IdentityProfile, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.outcome {
            MockOutcome::Profile(profile) => Ok(profile.clone()),
            MockOutcome::Failure => Err(IdentityError::ExchangeFailed(
                "mock exchange failure".to_string(),
            )),
        }
    }
}
